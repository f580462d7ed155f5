//! Response payload types

use serde::Serialize;

pub const HELP_TEXT: &str = "QR & Barcode Generator Agent\n\nCommands:\n• qr [text] - Generate QR code\n• barcode [text] - Generate barcode";
pub const QR_USAGE: &str = "Please provide text to generate QR code. Example: qr Hello World";
pub const BARCODE_USAGE: &str = "Please provide text to generate barcode. Example: barcode 1234567890";
pub const INVALID_REQUEST: &str = "Invalid request format. Send JSON with 'text' field.";

/// Conversational reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reply {
    Text { text: String },
    Image { text: String, image: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(text: impl Into<String>, image: impl Into<String>) -> Self {
        Self::Image {
            text: text.into(),
            image: image.into(),
        }
    }

    pub fn help() -> Self {
        Self::text(HELP_TEXT)
    }
}

/// `GET /` payload
#[derive(Debug, Serialize)]
pub struct ServiceInfo<'a> {
    pub message: &'a str,
    pub status: &'static str,
    pub version: &'a str,
}

/// `GET /health` payload
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_reply_shape() {
        let value = serde_json::to_value(Reply::text("hi")).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "hi"}));
    }

    #[test]
    fn test_image_reply_shape() {
        let value = serde_json::to_value(Reply::image("done", "data:image/png;base64,AA")).unwrap();
        assert_eq!(
            value,
            json!({"type": "image", "text": "done", "image": "data:image/png;base64,AA"})
        );
    }

    #[test]
    fn test_error_body_skips_missing_details() {
        let value = serde_json::to_value(ErrorBody::new("Not found")).unwrap();
        assert_eq!(value, json!({"error": "Not found"}));

        let value = serde_json::to_value(ErrorBody::new("boom").with_details("why")).unwrap();
        assert_eq!(value, json!({"error": "boom", "details": "why"}));
    }
}
