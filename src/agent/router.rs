//! Command router
//!
//! Classifies a request, dispatches it to one of a fixed set of handlers and
//! returns the status code with its JSON body. Holds no mutable state.

use hyper::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::a2a;
use super::command::{extract_message, Command};
use super::descriptor::DescriptorStore;
use super::reply::{
    ErrorBody, HealthStatus, Reply, ServiceInfo, BARCODE_USAGE, INVALID_REQUEST, QR_USAGE,
};
use crate::encoder::{CodeImageEncoder, EncodeOptions};
use crate::error::{AgentError, Result};
use crate::logger;

pub const DESCRIPTOR_PATH: &str = "/.well-known/agent.json";

/// Router output: HTTP status plus JSON body
pub type RouteResponse = (StatusCode, Value);

pub struct Router {
    name: String,
    version: String,
    descriptors: Box<dyn DescriptorStore>,
    encoder: Arc<dyn CodeImageEncoder>,
    options: EncodeOptions,
}

impl Router {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        descriptors: Box<dyn DescriptorStore>,
        encoder: Arc<dyn CodeImageEncoder>,
        options: EncodeOptions,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            descriptors,
            encoder,
            options,
        }
    }

    /// Handle one request. `body` is the fully buffered request body, if any.
    pub async fn handle(&self, method: &Method, path: &str, body: Option<&[u8]>) -> RouteResponse {
        match (method, path) {
            (&Method::GET, "/" | "") => (StatusCode::OK, to_json(&self.service_info())),
            (&Method::GET, "/health") => (StatusCode::OK, to_json(&health_status())),
            (&Method::GET, DESCRIPTOR_PATH) => self.agent_descriptor(),
            (_, DESCRIPTOR_PATH) => error_response(&AgentError::MethodNotAllowed),
            (&Method::POST, "/" | "") => self.handle_post(body.unwrap_or_default()).await,
            _ => error_response(&AgentError::NotFound),
        }
    }

    fn service_info(&self) -> ServiceInfo<'_> {
        ServiceInfo {
            message: &self.name,
            status: "active",
            version: &self.version,
        }
    }

    fn agent_descriptor(&self) -> RouteResponse {
        match self.descriptors.descriptor() {
            Ok(descriptor) => (StatusCode::OK, descriptor.clone()),
            Err(e) => {
                logger::log_error(&format!("Failed to load agent configuration: {e}"));
                let body = ErrorBody::new("Failed to load agent configuration").with_details(e.to_string());
                (e.status(), to_json(&body))
            }
        }
    }

    async fn handle_post(&self, body: &[u8]) -> RouteResponse {
        let request = match parse_body(body) {
            Ok(value) => value,
            Err(e) => {
                logger::log_warning(&e.to_string());
                return (e.status(), to_json(&Reply::text(INVALID_REQUEST)));
            }
        };

        if request.get("jsonrpc").is_some() {
            return (StatusCode::OK, a2a::handle(self, &request).await);
        }

        let reply = self.dispatch(extract_message(&request)).await;
        (StatusCode::OK, to_json(&reply))
    }

    /// Turn a chat message into a reply. Never fails: encoder errors become text.
    pub async fn dispatch(&self, message: &str) -> Reply {
        let command = Command::parse(message);
        logger::log_command(&command);

        match command {
            Command::Qr("") => Reply::text(QR_USAGE),
            Command::Qr(payload) => match self.encode(payload).await {
                Ok(image) => Reply::image(format!("QR code generated for: {payload}"), image),
                Err(e) => {
                    logger::log_warning(&format!("QR generation failed: {e}"));
                    Reply::text(format!("QR generation failed: {e}"))
                }
            },
            Command::Barcode("") => Reply::text(BARCODE_USAGE),
            Command::Barcode(payload) => Reply::text(format!(
                "Barcode generation for \"{payload}\" is not implemented yet. Try: qr {payload}"
            )),
            Command::Unknown => Reply::help(),
        }
    }

    async fn encode(&self, payload: &str) -> Result<String> {
        let encoder = Arc::clone(&self.encoder);
        let options = self.options;
        let text = payload.to_string();

        tokio::task::spawn_blocking(move || encoder.encode(&text, &options))
            .await
            .map_err(|e| AgentError::Encoding(format!("encoder task failed: {e}")))?
    }
}

fn health_status() -> HealthStatus {
    HealthStatus {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    }
}

/// Empty bodies count as `{}`
fn parse_body(body: &[u8]) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_slice(body)?)
}

/// Build the error object for a surfaced error
pub fn error_response(error: &AgentError) -> RouteResponse {
    (error.status(), to_json(&ErrorBody::new(error.to_string())))
}

/// Reply for an internal fault outside the router, e.g. a failed body read
pub fn server_error(error: &AgentError) -> RouteResponse {
    logger::log_error(&format!("Server error: {error}"));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        to_json(&Reply::text(format!("Server error: {error}"))),
    )
}

pub(super) fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to serialize response: {e}"));
        serde_json::json!({"error": "Internal server error"})
    })
}
