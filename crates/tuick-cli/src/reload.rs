//! The `--reload` callback invoked by the finder's reload binding and
//! by the watcher: posts a `reload` to the running session's control
//! endpoint using the port and token published via `TUICK_RELOAD_PORT`
//! / `TUICK_RELOAD_KEY`.

use tracing::{info, warn};
use tuick_core::{Result, TuickError};

/// Read the control endpoint's address from the environment and POST a
/// reload request to it.
pub async fn post_reload() -> Result<()> {
    let port: u16 = std::env::var("TUICK_RELOAD_PORT")
        .map_err(|_| TuickError::ReloadRejected("TUICK_RELOAD_PORT not set".into()))?
        .parse()
        .map_err(|_| TuickError::ReloadRejected("TUICK_RELOAD_PORT is not a valid port".into()))?;
    let key = std::env::var("TUICK_RELOAD_KEY")
        .map_err(|_| TuickError::ReloadRejected("TUICK_RELOAD_KEY not set".into()))?;

    let url = format!("http://127.0.0.1:{port}/reload");
    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .query(&[("key", key)])
        .send()
        .await
        .map_err(|e| TuickError::ReloadRejected(format!("failed to reach control endpoint: {e}")))?;

    if response.status().is_success() {
        info!(%url, "reload request accepted");
        Ok(())
    } else {
        warn!(status = %response.status(), "reload request rejected");
        Err(TuickError::ReloadRejected(format!(
            "control endpoint returned {}",
            response.status()
        )))
    }
}
