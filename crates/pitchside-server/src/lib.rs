//! HTTP boundary for the Pitchside league simulator.
//!
//! Read endpoints serve JSON projections from the world; the single
//! write endpoint runs `advance`; an SSE stream replays appended
//! events from a given sequence and then follows live. The core is
//! insensitive to this layer -- everything here is a view.

pub mod error;
pub mod handlers;
pub mod router;
pub mod sse;
pub mod state;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

pub use error::ServerError;
pub use router::build_router;
pub use state::AppState;

/// Bind and serve until the process is stopped.
///
/// # Errors
///
/// Returns [`ServerError::Internal`] when binding or serving fails.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> Result<(), ServerError> {
    let router = build_router(state);
    let address = format!("{host}:{port}");
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| ServerError::Internal(format!("cannot bind {address}: {e}")))?;
    info!(address = %address, "HTTP server listening");
    axum::serve(listener, router)
        .await
        .map_err(|e| ServerError::Internal(format!("server error: {e}")))?;
    Ok(())
}
