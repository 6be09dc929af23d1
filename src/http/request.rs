//! Request line and routing-relevant header extraction.
//!
//! # Responsibilities
//! - Parse method and target from the request line
//! - Extract the `Host` header used for routing
//! - Resolve `Host` into an upstream authority
//!
//! # Design Decisions
//! - Bytes are decoded as Latin-1 so no request is rejected for encoding
//! - The raw request is forwarded verbatim; nothing here mutates it

use std::fmt;

use crate::error::ProxyError;
use crate::http::headers::{HeaderBlock, HOST};
use crate::http::message::RawMessage;

/// The parts of a request the proxy routes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub host: Option<String>,
}

impl RequestHead {
    pub fn parse(request: &RawMessage) -> Result<Self, ProxyError> {
        // A short read may cut the request before the blank line; the
        // head is then everything we received.
        let head = match request.split() {
            Some((head, _)) => head,
            None => request.as_bytes(),
        };
        let block = HeaderBlock::parse(head);

        let start_line = latin1(block.start_line());
        let mut tokens = start_line.split_whitespace();
        let method = tokens
            .next()
            .ok_or(ProxyError::MalformedRequest("missing method"))?
            .to_string();
        let target = tokens
            .next()
            .ok_or(ProxyError::MalformedRequest("missing request target"))?
            .to_string();

        let host = block
            .get(HOST)
            .map(latin1)
            .filter(|h| !h.is_empty());

        Ok(Self { method, target, host })
    }

    pub fn is_connect(&self) -> bool {
        self.method.eq_ignore_ascii_case("CONNECT")
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Upstream host and port derived from a `Host` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    pub host: String,
    pub port: u16,
}

impl Authority {
    /// Parse `host`, `host:port`, `[v6]` or `[v6]:port`.
    pub fn parse(value: &str, default_port: u16) -> Result<Self, ProxyError> {
        let value = value.trim();

        let (host, port) = if let Some(rest) = value.strip_prefix('[') {
            let close = rest
                .find(']')
                .ok_or(ProxyError::MalformedRequest("unterminated IPv6 host"))?;
            let port = match &rest[close + 1..] {
                "" => None,
                tail => Some(
                    tail.strip_prefix(':')
                        .ok_or(ProxyError::MalformedRequest("invalid Host header"))?,
                ),
            };
            (&rest[..close], port)
        } else {
            match value.rsplit_once(':') {
                Some((host, port)) if !host.contains(':') => (host, Some(port)),
                _ => (value, None),
            }
        };

        if host.is_empty() {
            return Err(ProxyError::MissingHost);
        }

        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ProxyError::MalformedRequest("invalid port in Host header"))?,
            None => default_port,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<RequestHead, ProxyError> {
        RequestHead::parse(&RawMessage::from(raw.as_bytes().to_vec()))
    }

    #[test]
    fn parses_method_target_and_host() {
        let head = parse("GET http://example.com/ HTTP/1.1\r\nhost:  example.com \r\nAccept: */*\r\n\r\n").unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.target, "http://example.com/");
        assert_eq!(head.host.as_deref(), Some("example.com"));
        assert!(!head.is_connect());
    }

    #[test]
    fn detects_connect() {
        let head = parse("CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n").unwrap();
        assert!(head.is_connect());
    }

    #[test]
    fn missing_tokens_are_malformed() {
        assert!(matches!(parse("GET\r\n\r\n"), Err(ProxyError::MalformedRequest(_))));
        assert!(matches!(parse("\r\n\r\n"), Err(ProxyError::MalformedRequest(_))));
    }

    #[test]
    fn missing_host_is_none() {
        let head = parse("GET / HTTP/1.0\r\n\r\n").unwrap();
        assert!(head.host.is_none());
    }

    #[test]
    fn truncated_request_still_parses() {
        let head = parse("GET / HTTP/1.1\r\nHost: example.com\r\nUser-Ag").unwrap();
        assert_eq!(head.host.as_deref(), Some("example.com"));
    }

    #[test]
    fn authority_forms() {
        assert_eq!(
            Authority::parse("example.com", 80).unwrap(),
            Authority { host: "example.com".into(), port: 80 }
        );
        assert_eq!(Authority::parse("example.com:8080", 80).unwrap().port, 8080);
        assert_eq!(
            Authority::parse("[::1]:81", 80).unwrap(),
            Authority { host: "::1".into(), port: 81 }
        );
        assert_eq!(Authority::parse("[::1]", 80).unwrap().port, 80);
        assert!(Authority::parse("example.com:http", 80).is_err());
        assert!(Authority::parse(":80", 80).is_err());
    }

    #[test]
    fn authority_display_brackets_ipv6() {
        let a = Authority::parse("[::1]:81", 80).unwrap();
        assert_eq!(a.to_string(), "[::1]:81");
    }
}
