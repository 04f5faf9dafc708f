//! # tuick-control
//!
//! The loopback-only, token-authenticated control endpoint. Editor
//! integrations and shell hooks POST to this endpoint to ask a running
//! Tuick session to re-run its checker without restarting the fuzzy
//! finder.
//!
//! This crate knows nothing about the session controller itself — it is
//! handed a channel sender at construction time and only ever posts a
//! unit reload signal into it. That keeps the dependency edge pointing
//! one way: `tuick-runtime` depends on `tuick-control`, never the
//! reverse.

use axum::{
    Router,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use base64::Engine;
use rand::RngCore;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

const RELOAD_HEADER: &str = "x-tuick-reload-key";
const RELOAD_QUERY_PARAM: &str = "key";

/// A bearer secret for the `/reload` endpoint: 128 bits of randomness,
/// base64url-encoded with no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadToken(String);

impl ReloadToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        ReloadToken(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReloadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared state behind the router: the expected token and a handle to
/// the session controller's reload queue.
pub struct ControlState {
    token: ReloadToken,
    reload_tx: mpsc::Sender<()>,
}

impl ControlState {
    pub fn new(token: ReloadToken, reload_tx: mpsc::Sender<()>) -> Arc<Self> {
        Arc::new(ControlState { token, reload_tx })
    }
}

/// Build the router: a single `POST /reload` route behind a loopback
/// check and a token check.
pub fn build_router(state: Arc<ControlState>) -> Router {
    Router::new()
        .route("/reload", post(reload_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            loopback_and_token_gate,
        ))
        .with_state(state)
}

/// Rejects requests from non-loopback peers with `403`, then checks the
/// reload token (header or query parameter) and rejects mismatches with
/// `401`.
async fn loopback_and_token_gate(
    State(state): State<Arc<ControlState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<Response, StatusCode> {
    if !is_loopback(peer.ip()) {
        warn!(%peer, "rejected control request from non-loopback peer");
        return Err(StatusCode::FORBIDDEN);
    }

    let provided = headers
        .get(RELOAD_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| query_param(request.uri().query().unwrap_or(""), RELOAD_QUERY_PARAM));

    match provided {
        Some(key) if key == state.token.as_str() => {}
        _ => {
            warn!("rejected control request with missing or invalid reload token");
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(request).await)
}

fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}

fn query_param<'a>(query: &'a str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?;
        let value = parts.next().unwrap_or("");
        (key == name).then(|| value.to_string())
    })
}

/// The `/reload` handler posts a unit signal into the session
/// controller's bounded single-slot queue. If a reload is already
/// pending the new request coalesces with it (drop-newer) — this is
/// not an error, so we still answer `202 Accepted`.
async fn reload_handler(State(state): State<Arc<ControlState>>) -> impl IntoResponse {
    match state.reload_tx.try_send(()) {
        Ok(()) => {
            info!("reload request accepted");
            StatusCode::ACCEPTED
        }
        Err(mpsc::error::TrySendError::Full(())) => {
            info!("reload request coalesced with a pending reload");
            StatusCode::ACCEPTED
        }
        Err(mpsc::error::TrySendError::Closed(())) => {
            warn!("reload request dropped: session controller is gone");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// A running control endpoint bound to an OS-assigned loopback port.
pub struct ControlEndpoint {
    pub port: u16,
    pub token: ReloadToken,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: tokio::task::JoinHandle<()>,
}

impl ControlEndpoint {
    /// Bind an ephemeral loopback port and start serving. `reload_tx` is
    /// the session controller's reload queue.
    pub async fn start(reload_tx: mpsc::Sender<()>) -> std::io::Result<Self> {
        let token = ReloadToken::generate();
        let state = ControlState::new(token.clone(), reload_tx);
        let router = build_router(state);

        let listener = TcpListener::bind((IpAddr::from([127, 0, 0, 1]), 0)).await?;
        let port = listener.local_addr()?.port();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let make_service = router.into_make_service_with_connect_info::<SocketAddr>();

        let join = tokio::spawn(async move {
            let server = axum::serve(listener, make_service).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = server.await {
                warn!(%err, "control endpoint exited with an error");
            }
        });

        info!(port, "control endpoint listening on 127.0.0.1");
        Ok(ControlEndpoint {
            port,
            token,
            shutdown_tx: Some(shutdown_tx),
            join,
        })
    }

    /// The loopback URL reload requests should be sent to.
    pub fn reload_url(&self) -> String {
        format!("http://127.0.0.1:{}/reload", self.port)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.join.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_tokens_are_url_safe_and_distinct() {
        let a = ReloadToken::generate();
        let b = ReloadToken::generate();
        assert_ne!(a.as_str(), b.as_str());
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn query_param_extracts_the_key_value() {
        assert_eq!(query_param("key=abc&other=1", "key"), Some("abc".to_string()));
        assert_eq!(query_param("other=1", "key"), None);
        assert_eq!(query_param("", "key"), None);
    }

    #[test]
    fn loopback_recognises_v4_and_v6() {
        assert!(is_loopback("127.0.0.1".parse().unwrap()));
        assert!(is_loopback("::1".parse().unwrap()));
        assert!(!is_loopback("10.0.0.1".parse().unwrap()));
    }

    #[tokio::test]
    async fn reload_handler_coalesces_a_pending_reload() {
        let (tx, mut rx) = mpsc::channel(1);
        let state = ControlState::new(ReloadToken::generate(), tx);

        let first = reload_handler(State(state.clone())).await.into_response();
        assert_eq!(first.status(), StatusCode::ACCEPTED);

        let second = reload_handler(State(state.clone())).await.into_response();
        assert_eq!(second.status(), StatusCode::ACCEPTED);

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reload_handler_reports_service_unavailable_once_controller_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let state = ControlState::new(ReloadToken::generate(), tx);
        let resp = reload_handler(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
