//! HTTP response building module
//!
//! Every response is JSON. CORS headers are added when enabled.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::Value;

use crate::config::HttpConfig;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

fn base_builder(status: StatusCode, http: &HttpConfig) -> hyper::http::response::Builder {
    let builder = Response::builder()
        .status(status)
        .header("Server", http.server_name.as_str());

    if http.enable_cors {
        builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOW_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
    } else {
        builder
    }
}

/// Build a JSON response
pub fn build_json_response(status: StatusCode, body: &Value, http: &HttpConfig) -> Response<Full<Bytes>> {
    let json = body.to_string();
    let content_length = json.len();

    base_builder(status, http)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback_response(Bytes::from_static(br#"{"error":"Internal server error"}"#))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(http: &HttpConfig) -> Response<Full<Bytes>> {
    let mut builder = base_builder(StatusCode::NO_CONTENT, http).header("Allow", ALLOW_METHODS);
    if http.enable_cors {
        builder = builder.header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        fallback_response(Bytes::new())
    })
}

/// Build 413 Payload Too Large response
pub fn build_413_response(max_body_size: u64, http: &HttpConfig) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Payload too large",
        "details": format!("Request body exceeds {max_body_size} bytes")
    });
    build_json_response(StatusCode::PAYLOAD_TOO_LARGE, &body, http)
}

/// Plain 500 used when a builder rejects its headers
fn fallback_response(body: Bytes) -> Response<Full<Bytes>> {
    let has_body = !body.is_empty();
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    if has_body {
        response.headers_mut().insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("application/json"),
        );
    }
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn http_config(enable_cors: bool) -> HttpConfig {
        HttpConfig {
            server_name: "qr-test".to_string(),
            enable_cors,
            max_body_size: 16,
        }
    }

    async fn body_json(resp: Response<Full<Bytes>>) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_response_headers() {
        let resp = build_json_response(StatusCode::OK, &serde_json::json!({"ok": true}), &http_config(false));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        assert_eq!(resp.headers()["Server"], "qr-test");
        assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
        assert_eq!(body_json(resp).await, serde_json::json!({"ok": true}));
    }

    #[test]
    fn test_cors_headers() {
        let resp = build_json_response(StatusCode::NOT_FOUND, &Value::Null, &http_config(true));
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
    }

    #[test]
    fn test_options_response() {
        let resp = build_options_response(&http_config(true));
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Allow"], ALLOW_METHODS);
        assert_eq!(resp.headers()["Access-Control-Max-Age"], "86400");

        let resp = build_options_response(&http_config(false));
        assert!(resp.headers().get("Access-Control-Max-Age").is_none());
    }

    #[tokio::test]
    async fn test_build_failure_falls_back_to_500() {
        let mut http = http_config(false);
        http.server_name = "bad\nname".to_string();

        let resp = build_json_response(StatusCode::OK, &serde_json::json!({"ok": true}), &http);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        assert_eq!(body_json(resp).await, serde_json::json!({"error": "Internal server error"}));

        let resp = build_options_response(&http);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_413_response() {
        let resp = build_413_response(16, &http_config(false));
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Payload too large");
        assert!(body["details"].as_str().unwrap().contains("16"));
    }
}
