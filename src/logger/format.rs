//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variable` substitution

use crate::context::HttpContext;
use chrono::{DateTime, Local};
use serde::Serialize;

const TIME_LOCAL: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Access log entry for one bound request
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version as sent on the wire (HTTP/1.1)
    pub proto: String,
    /// Detected request content type, `-` when absent
    pub content_type: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
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
    /// Start an entry from the request snapshot, timestamped now
    pub fn from_context(ctx: &HttpContext) -> Self {
        let remote_addr = if ctx.http_url.remote_addr.is_empty() {
            "-".to_string()
        } else {
            ctx.http_url.remote_addr.clone()
        };
        let content_type = if ctx.content_type.is_empty() {
            "-".to_string()
        } else {
            ctx.content_type.clone()
        };
        Self {
            remote_addr,
            time: Local::now(),
            method: ctx.method.to_string(),
            path: ctx.http_url.path.clone(),
            query: Some(ctx.http_url.query_string.clone()).filter(|q| !q.is_empty()),
            proto: ctx.http_url.proto.clone(),
            content_type,
            status: 200,
            body_bytes: 0,
            referer: ctx.header("referer").map(ToString::to_string),
            user_agent: ctx.header("user-agent").map(ToString::to_string),
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
            "json" => serde_json::to_string(self).unwrap_or_default(),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        self.query
            .as_ref()
            .map_or_else(|| self.path.clone(), |q| format!("{}?{q}", self.path))
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} {}\" {} {}",
            self.remote_addr,
            self.time.format(TIME_LOCAL),
            self.method,
            self.request_uri(),
            self.proto,
            self.status,
            self.body_bytes,
        )
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$request_time`,
    /// `$content_type`, `$status`, `$body_bytes_sent`, `$http_referer`,
    /// `$http_user_agent`.
    fn format_custom(&self, pattern: &str) -> String {
        let request_uri = self.request_uri();
        let request_line = format!("{} {} {}", self.method, request_uri, self.proto);
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        // $request_* must be replaced before $request
        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace("$time_local", &self.time.format(TIME_LOCAL).to_string())
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$request_time", &format!("{request_time:.3}"))
            .replace("$request_method", &self.method)
            .replace("$request_uri", &request_uri)
            .replace("$request", &request_line)
            .replace("$content_type", &self.content_type)
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
            .replace("$http_referer", self.referer.as_deref().unwrap_or("-"))
            .replace("$http_user_agent", self.user_agent.as_deref().unwrap_or("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Bytes;
    use hyper::Request;

    fn create_test_entry() -> AccessLogEntry {
        let (parts, ()) = Request::post("/api/users?page=1")
            .header("Content-Type", "application/json")
            .header("Referer", "https://example.com")
            .header("User-Agent", "Mozilla/5.0")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = HttpContext::from_parts(&parts, Bytes::new(), false);

        let mut entry = AccessLogEntry::from_context(&ctx);
        entry.remote_addr = "192.168.1.1".to_string();
        entry.body_bytes = 1234;
        entry.request_time_us = 1_250_000;
        entry
    }

    #[test]
    fn test_from_context() {
        let entry = create_test_entry();
        assert_eq!(entry.method, "POST");
        assert_eq!(entry.path, "/api/users");
        assert_eq!(entry.query.as_deref(), Some("page=1"));
        assert_eq!(entry.content_type, "application/json");
        assert_eq!(entry.proto, "HTTP/1.1");
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format("combined");
        assert!(log.contains("192.168.1.1"));
        assert!(log.contains("POST /api/users?page=1 HTTP/1.1"));
        assert!(log.contains("200 1234"));
        assert!(log.contains("https://example.com"));
        assert!(log.contains("Mozilla/5.0"));
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format("common");
        assert!(log.contains("POST /api/users?page=1 HTTP/1.1"));
        assert!(log.contains("200 1234"));
        // Common format does not include referer/user-agent
        assert!(!log.contains("https://example.com"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format("json");
        let parsed: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(parsed["remote_addr"], "192.168.1.1");
        assert_eq!(parsed["method"], "POST");
        assert_eq!(parsed["status"], 200);
        assert_eq!(parsed["body_bytes"], 1234);
        assert_eq!(parsed["content_type"], "application/json");
    }

    #[test]
    fn test_format_custom() {
        let log = create_test_entry().format("$remote_addr $request_method $content_type $status $request_time");
        assert_eq!(log, "192.168.1.1 POST application/json 200 1.250");
    }
}
