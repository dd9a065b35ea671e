//! Inbound HTTP surface (axum).
//!
//! Exposes the `clean` intent to the bot platform and maps core errors onto
//! responses.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Instant};

use axum::{
    extract::{Request as HttpRequest, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing::{error, info};

pub mod contract;
pub mod formatter;
pub mod handler;

use crate::{
    contract::{Request, Response},
    handler::{Handler, APP_ID},
};

/// A non-validation error from a synchronous intent call.
pub struct IntentError(mgmt_core::Error);

impl IntoResponse for IntentError {
    fn into_response(self) -> HttpResponse {
        error!(component = APP_ID, error = %self.0, "intent failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub fn router(handler: Arc<Handler>) -> Router {
    Router::new()
        .route("/clean", post(clean))
        .route_layer(middleware::from_fn(log_intent))
        .route("/healthz", get(healthz))
        .with_state(handler)
}

async fn clean(
    State(handler): State<Arc<Handler>>,
    Json(request): Json<Request>,
) -> Result<Json<Response>, IntentError> {
    handler.clean(request).await.map(Json).map_err(IntentError)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn log_intent(req: HttpRequest, next: Next) -> HttpResponse {
    let intent = req.uri().path().trim_start_matches('/').to_string();
    let begin = Instant::now();
    let resp = next.run(req).await;
    info!(
        component = APP_ID,
        intent = %intent,
        status = resp.status().as_u16(),
        took = ?begin.elapsed(),
        "called"
    );
    resp
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
///
/// Background cleanups are not waited for.
pub async fn serve(
    addr: SocketAddr,
    handler: Arc<Handler>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(component = APP_ID, %addr, "starting");

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!(component = APP_ID, "stopping");
        })
        .await?;

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "received signal"),
        _ = terminate => info!(signal = "SIGTERM", "received signal"),
    }
}
