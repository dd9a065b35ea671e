use mgmt_core::Error;

use crate::contract::Response;

/// Render user-facing failures as a chat reply; pass everything else on.
pub fn format_error(err: Error) -> Result<Response, Error> {
    if err.is_validation() {
        return Ok(Response::text(err.to_string()));
    }
    Err(err)
}
