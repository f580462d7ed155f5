//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with variables

use chrono::{DateTime, Local};
use serde::Serialize;

/// Access log entry for one request/response pair
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

fn serialize_rfc3339<S: serde::Serializer>(
    time: &DateTime<Local>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339())
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            user_agent: None,
            referer: None,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "common" => self.format_common(),
            "json" => serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$status`,
    /// `$body_bytes_sent`, `$http_user_agent`, `$http_referer`,
    /// `$request_time` (seconds). Unknown variables are kept as written.
    fn format_custom(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() * 2);
        let mut rest = pattern;

        // Single pass: substituted values are never rescanned
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let name_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..name_len];

            match self.variable(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &after[name_len..];
        }

        out.push_str(rest);
        out
    }

    fn variable(&self, name: &str) -> Option<String> {
        let value = match name {
            "remote_addr" => self.remote_addr.clone(),
            "time_local" => self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            "time_iso8601" => self.time.to_rfc3339(),
            "request" => format!("{} {} HTTP/{}", self.method, self.request_uri(), self.http_version),
            "request_method" => self.method.clone(),
            "request_uri" => self.request_uri(),
            "status" => self.status.to_string(),
            "body_bytes_sent" => self.body_bytes.to_string(),
            "http_user_agent" => self.user_agent.clone().unwrap_or_else(|| "-".to_string()),
            "http_referer" => self.referer.clone().unwrap_or_else(|| "-".to_string()),
            "request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let seconds = self.request_time_us as f64 / 1_000_000.0;
                format!("{seconds:.3}")
            }
            _ => return None,
        };
        Some(value)
    }
}
