/// Core error type for the management service.
///
/// Adapter crates map their specific errors into this type so the request
/// handler can tell user-facing validation failures apart from everything else.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Expected, user-facing failure (e.g. missing permission).
    #[error("{0}")]
    Validation(String),

    /// Any failure reported by, or while talking to, the chat platform.
    #[error("platform error: {0}")]
    Platform(String),

    /// A message id or timestamp that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn user_permissions() -> Self {
        Error::Validation("You do not have permission to clean this channel.".to_string())
    }

    /// Whether this error should be rendered back to the requesting user.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
