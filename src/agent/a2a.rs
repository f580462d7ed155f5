//! A2A JSON-RPC support on `POST /`
//!
//! Only `message/send` is understood. The first text part of the incoming
//! message goes through the same command dispatch as plain chat requests.

use serde::Serialize;
use serde_json::Value;

use super::reply::Reply;
use super::router::{to_json, Router};

const JSONRPC_VERSION: &str = "2.0";
const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<AgentMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentMessage {
    role: &'static str,
    parts: Vec<Part>,
    kind: &'static str,
    message_id: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Part {
    Text {
        text: String,
    },
    Data {
        data: String,
        #[serde(rename = "contentType")]
        content_type: &'static str,
    },
}

impl From<Reply> for AgentMessage {
    fn from(reply: Reply) -> Self {
        let parts = match reply {
            Reply::Text { text } => vec![Part::Text { text }],
            Reply::Image { text, image } => vec![
                Part::Text { text },
                Part::Data {
                    data: image,
                    content_type: "image/png",
                },
            ],
        };

        Self {
            role: "agent",
            parts,
            kind: "message",
            message_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Handle a parsed JSON-RPC request and return the JSON-RPC response object
pub async fn handle(router: &Router, request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);

    let response = match request.get("method").and_then(Value::as_str) {
        Some("message/send") => {
            let reply = router.dispatch(first_text_part(request)).await;
            RpcResponse {
                jsonrpc: JSONRPC_VERSION,
                id,
                result: Some(reply.into()),
                error: None,
            }
        }
        _ => RpcResponse {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(RpcError {
                code: METHOD_NOT_FOUND,
                message: "Method not found",
            }),
        },
    };

    to_json(&response)
}

/// Text of the first part whose `kind` (or legacy `type`) is `text`
fn first_text_part(request: &Value) -> &str {
    request
        .pointer("/params/message/parts")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|part| {
            part.get("kind").and_then(Value::as_str) == Some("text")
                || part.get("type").and_then(Value::as_str) == Some("text")
        })
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
        .unwrap_or("")
}
