//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::Local;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Access log entry containing all request/response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
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
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.format_combined(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {} HTTP/{}",
            self.method,
            self.request_uri(),
            self.http_version
        )
    }

    /// Apache/Nginx Combined Log Format
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    /// JSON structured log format
    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client IP address
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request` - Full request line ("METHOD /path HTTP/version")
    /// - `$request_method` - HTTP method
    /// - `$request_uri` - Request URI with query string
    /// - `$status` - Response status code
    /// - `$body_bytes_sent` - Response body size
    /// - `$http_referer` - Referer header
    /// - `$http_user_agent` - User-Agent header
    /// - `$request_time` - Request processing time in seconds (3 decimal places)
    fn format_custom(&self, pattern: &str) -> String {
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        // $request_time, $request_method and $request_uri must be replaced before $request
        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace("$time_local", &self.time.format(CLF_TIME).to_string())
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$request_time", &format!("{request_time:.3}"))
            .replace("$request_method", &self.method)
            .replace("$request_uri", &self.request_uri())
            .replace("$request", &self.request_line())
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
            .replace("$http_referer", self.referer.as_deref().unwrap_or("-"))
            .replace("$http_user_agent", self.user_agent.as_deref().unwrap_or("-"))
    }
}
