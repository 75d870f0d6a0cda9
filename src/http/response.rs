use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub code: u16,
    pub reason: &'static str,
}

pub const OK: Status = Status { code: 200, reason: "OK" };
pub const BAD_REQUEST: Status = Status { code: 400, reason: "Bad Request" };
pub const NOT_FOUND: Status = Status { code: 404, reason: "Not Found" };
pub const TOO_MANY_REQUESTS: Status = Status { code: 429, reason: "Too Many Requests" };
pub const INTERNAL_SERVER_ERROR: Status = Status { code: 500, reason: "Internal Server Error" };
pub const SERVICE_UNAVAILABLE: Status = Status { code: 503, reason: "Service Unavailable" };

#[derive(Debug, Clone)]
pub struct Response {
    pub version: String,
    pub status: Status,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: Status) -> Self {
        Self {
            version: "HTTP/1.0".into(),
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn set_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// JSON body with the matching content type.
    pub fn json<T: Serialize>(status: Status, value: &T) -> Self {
        let body = serde_json::to_vec_pretty(value)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {}\"}}", e).into_bytes());
        Self::new(status)
            .set_header("Content-Type", "application/json")
            .with_body(body)
    }

    pub fn html(status: Status, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status)
            .set_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn http_date() -> String {
        Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    pub fn to_bytes(&self, is_head: bool) -> Vec<u8> {
        let mut buffer = String::new();

        let _ = write!(
            buffer,
            "{} {} {}\r\n",
            self.version, self.status.code, self.status.reason
        );

        let date = Self::http_date();
        let body_len = self.body.len();

        let _ = write!(buffer, "Date: {}\r\n", date);
        let _ = write!(buffer, "Server: prime-factor/0.1\r\n");
        let _ = write!(buffer, "Connection: close\r\n");
        let _ = write!(buffer, "Content-Length: {}\r\n", body_len);

        if self.header("Content-Type").is_none() {
            let _ = write!(buffer, "Content-Type: text/plain; charset=utf-8\r\n");
        }

        for (key, value) in &self.headers {
            let key_lower = key.to_ascii_lowercase();
            if ["content-length", "connection", "date", "server"].contains(&key_lower.as_str()) {
                continue;
            }
            let _ = write!(buffer, "{}: {}\r\n", key, value);
        }

        buffer.push_str("\r\n");

        let mut response_bytes = buffer.into_bytes();
        if !is_head {
            response_bytes.extend_from_slice(&self.body);
        }

        response_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes_layout() {
        let resp = Response::new(OK).with_body("hello");
        let text = String::from_utf8(resp.to_bytes(false)).unwrap();
        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_head_omits_body() {
        let resp = Response::html(OK, "<p>hi</p>");
        let text = String::from_utf8(resp.to_bytes(true)).unwrap();
        assert!(text.contains("Content-Length: 9\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_json_sets_content_type() {
        let resp = Response::json(BAD_REQUEST, &serde_json::json!({"error": "bad"}));
        assert_eq!(resp.header("content-type"), Some("application/json"));
        let value: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(value["error"], "bad");
    }
}
