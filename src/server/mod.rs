pub mod routes;

use crate::core::engine::PuzzleEngine;
use crate::utils::error::Result;
use std::net::SocketAddr;
use std::sync::Arc;

pub use routes::routes;

/// Serves the API until Ctrl-C.
pub async fn serve(engine: Arc<PuzzleEngine>, addr: SocketAddr) -> Result<()> {
    let (bound, server) = warp::serve(routes(engine))
        .try_bind_with_graceful_shutdown(addr, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("🛑 Shutdown signal received");
            }
        })
        .map_err(std::io::Error::other)?;

    tracing::info!("🌐 Serving puzzle API at http://{}", bound);
    server.await;
    Ok(())
}
