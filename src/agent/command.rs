//! Chat command parsing

use serde_json::Value;

/// Parsed intent of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `qr <payload>`, payload trimmed and possibly empty
    Qr(&'a str),
    /// `barcode <payload>`, payload trimmed and possibly empty
    Barcode(&'a str),
    Unknown,
}

impl<'a> Command<'a> {
    /// Classify a message by its case-insensitive prefix
    pub fn parse(message: &'a str) -> Self {
        if let Some(rest) = strip_prefix_ignore_case(message, "qr ") {
            Self::Qr(rest.trim())
        } else if let Some(rest) = strip_prefix_ignore_case(message, "barcode ") {
            Self::Barcode(rest.trim())
        } else {
            Self::Unknown
        }
    }
}

fn strip_prefix_ignore_case<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    let head = message.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&message[prefix.len()..])
    } else {
        None
    }
}

/// Pull the chat message out of a request body.
///
/// `text` wins when it is a non-empty string, then `message`; anything else
/// counts as an empty message.
pub fn extract_message(body: &Value) -> &str {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    field("text").or_else(|| field("message")).unwrap_or("")
}
