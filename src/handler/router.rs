//! Request dispatch module
//!
//! Entry point for HTTP request processing: preflight and body size checks,
//! body buffering, then hand-off to the agent's command router.

use crate::agent::server_error;
use crate::config::AppState;
use crate::error::AgentError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry.referer = req
        .headers()
        .get("referer")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let response = dispatch(req, &state).await;

    if state.cached_access_log.load(Ordering::Relaxed) {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let http_config = &state.config.http;
    let max_body_size = http_config.max_body_size;

    // 1. CORS preflight
    if req.method() == Method::OPTIONS {
        return http::build_options_response(http_config);
    }

    // 2. Reject declared oversized bodies before reading them
    if exceeds_declared_size(&req, max_body_size) {
        return http::build_413_response(max_body_size, http_config);
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    // 3. Buffer POST bodies, then route
    let (status, body) = if method == Method::POST {
        let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
        match Limited::new(req.into_body(), limit).collect().await {
            Ok(collected) => {
                let bytes = collected.to_bytes();
                state.router.handle(&method, &path, Some(&bytes)).await
            }
            Err(e) if e.is::<LengthLimitError>() => {
                logger::log_warning(&format!("Request body too large (max: {max_body_size})"));
                return http::build_413_response(max_body_size, http_config);
            }
            Err(e) => server_error(&AgentError::BodyRead(e.to_string())),
        }
    } else {
        state.router.handle(&method, &path, None).await
    };

    http::build_json_response(status, &body, http_config)
}

/// Check the Content-Length header against the configured limit
fn exceeds_declared_size<B>(req: &Request<B>, max_body_size: u64) -> bool {
    let Some(content_length) = req.headers().get("content-length") else {
        return false;
    };

    match content_length.to_str().ok().map(str::parse::<u64>) {
        Some(Ok(size)) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            true
        }
        Some(Ok(_)) => false,
        _ => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            false
        }
    }
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::descriptor::StaticDescriptorStore;
    use crate::agent::Router;
    use crate::config::Config;
    use crate::encoder::{EncodeOptions, QrPngEncoder};
    use hyper::StatusCode;
    use serde_json::{json, Value};

    fn state(max_body_size: u64) -> Arc<AppState> {
        let mut config = Config::load_from("/nonexistent/qr-agent-config").unwrap();
        config.http.max_body_size = max_body_size;
        config.logging.access_log = false;
        let router = Router::new(
            &config.agent.name,
            &config.agent.version,
            Box::new(StaticDescriptorStore::builtin(&config.agent)),
            Arc::new(QrPngEncoder::new()),
            EncodeOptions::default(),
        );
        Arc::new(AppState::new(&config, router))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(req: Request<Full<Bytes>>, state: Arc<AppState>) -> (StatusCode, Value) {
        let resp = handle_request(req, state, peer()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn request(method: Method, path: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_root_over_http() {
        let (status, body) = send(request(Method::GET, "/", ""), state(1024)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");
    }

    #[tokio::test]
    async fn test_post_qr_over_http() {
        let (status, body) = send(
            request(Method::POST, "/", r#"{"text":"qr hello"}"#),
            state(1024),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "image");
        assert!(body["image"].as_str().unwrap().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_post_invalid_json_over_http() {
        let (status, body) = send(request(Method::POST, "/", "not json"), state(1024)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "text");
    }

    #[tokio::test]
    async fn test_query_string_ignored_for_routing() {
        let (status, _) = send(request(Method::GET, "/health?verbose=1", ""), state(1024)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_found_over_http() {
        let (status, body) = send(request(Method::GET, "/nope", ""), state(1024)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let (status, body) = send(request(Method::OPTIONS, "/", ""), state(1024)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_body_over_limit_is_413() {
        let big = format!(r#"{{"text":"qr {}"}}"#, "a".repeat(64));
        let (status, body) = send(request(Method::POST, "/", &big), state(16)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Payload too large");
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_is_413() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-length", "4096")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let (status, _) = send(req, state(16)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    /// Body whose first frame is a read error
    struct BrokenBody;

    impl Body for BrokenBody {
        type Data = Bytes;
        type Error = std::io::Error;

        fn poll_frame(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Option<Result<hyper::body::Frame<Self::Data>, Self::Error>>> {
            std::task::Poll::Ready(Some(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))))
        }
    }

    #[tokio::test]
    async fn test_body_read_failure_is_500_text() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .body(BrokenBody)
            .unwrap();
        let resp = handle_request(req, state(1024), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()["Content-Type"], "application/json");

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["type"], "text");
        assert_eq!(body["text"], "Server error: connection reset by peer");
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
