use std::collections::HashMap;
use std::io::{Read, BufRead, BufReader};

use crate::http::errors::ServerError;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    HEAD,
    POST,
    Unsupported(String),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: String,
    pub version: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self, ServerError> {
        let mut reader = BufReader::new(reader);

        let mut request_line = String::new();
        reader.read_line(&mut request_line)?;
        let request_line = request_line.trim();

        if request_line.is_empty() {
            return Err(ServerError::BadRequest("Empty request line".into()));
        }

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(ServerError::BadRequest(format!(
                "Malformed request line: '{}'", request_line
            )));
        }

        let method = match parts[0] {
            "GET" => HttpMethod::GET,
            "HEAD" => HttpMethod::HEAD,
            "POST" => HttpMethod::POST,
            other => HttpMethod::Unsupported(other.to_string()),
        };

        let (path, query) = match parts[1].split_once('?') {
            Some((p, q)) => (p.to_string(), q.to_string()),
            None => (parts[1].to_string(), String::new()),
        };
        let version = parts[2].to_string();

        // browsers speak 1.1; every response still closes the connection
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ServerError::BadRequest(format!(
                "Only HTTP/1.0 and HTTP/1.1 are supported (got '{}')", version
            )));
        }

        let mut headers = HashMap::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                break; // EOF
            }

            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                break; // End of headers
            }

            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            } else {
                return Err(ServerError::BadRequest(format!(
                    "Invalid header format: '{}'", line
                )));
            }
        }

        let mut body = Vec::new();
        if let Some(content_length) = headers
            .get("content-length")
            .and_then(|v| v.parse::<usize>().ok())
        {
            if content_length > MAX_BODY_BYTES {
                return Err(ServerError::BadRequest("Request body too large".into()));
            }
            let mut limited = reader.take(content_length as u64);
            limited.read_to_end(&mut body)?;
        }

        Ok(HttpRequest {
            method,
            path,
            query,
            version,
            headers,
            body,
        })
    }

    /// Header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(raw: &str) -> Result<HttpRequest, ServerError> {
        HttpRequest::parse(&mut Cursor::new(raw.as_bytes().to_vec()))
    }

    #[test]
    fn test_parse_get_with_query() {
        let req = parse("GET /factor?n=100 HTTP/1.1\r\nHost: x\r\nCookie: pf_session=abc\r\n\r\n").unwrap();
        assert_eq!(req.method, HttpMethod::GET);
        assert_eq!(req.path, "/factor");
        assert_eq!(req.query, "n=100");
        assert_eq!(req.header("COOKIE"), Some("pf_session=abc"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_parse_post_body() {
        let req = parse("POST / HTTP/1.0\r\nContent-Length: 5\r\n\r\nn=12x").unwrap();
        assert_eq!(req.method, HttpMethod::POST);
        assert_eq!(req.query, "");
        assert_eq!(req.body, b"n=12x");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(parse("\r\n"), Err(ServerError::BadRequest(_))));
        assert!(matches!(parse("GET /\r\n\r\n"), Err(ServerError::BadRequest(_))));
        assert!(matches!(parse("GET / HTTP/2\r\n\r\n"), Err(ServerError::BadRequest(_))));
        assert!(matches!(parse("GET / HTTP/1.0\r\nbroken\r\n\r\n"), Err(ServerError::BadRequest(_))));
    }
}
