//! Knowing when a request or response has fully arrived.
//!
//! # Responsibilities
//! - Request framing: read until a short read or end of stream
//! - Response framing: read the head, then honour `Content-Length`,
//!   otherwise read until the origin closes
//!
//! # Design Decisions
//! - Every read is bounded by the per-connection timeout
//! - An elapsed response read delivers what has arrived so far
//! - The request heuristic is deliberately simple: large or slowly
//!   trickling requests may be cut short, and chunked bodies are not
//!   understood

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ProxyError;
use crate::http::headers::HeaderBlock;
use crate::http::message::{find_header_end, RawMessage, HEADER_TERMINATOR};

/// Reads complete HTTP messages off a byte stream.
#[derive(Debug, Clone, Copy)]
pub struct MessageReader {
    buffer_size: usize,
    read_timeout: Duration,
}

impl MessageReader {
    pub fn new(buffer_size: usize, read_timeout: Duration) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            read_timeout,
        }
    }

    /// Read a request from the client.
    ///
    /// Stops after the first read that returns fewer bytes than the buffer
    /// capacity, or at end of stream. An empty result means the client sent
    /// nothing. Timing out before any byte arrived is an error; timing out
    /// afterwards yields the partial request.
    pub async fn read_request<S>(&self, stream: &mut S) -> Result<RawMessage, ProxyError>
    where
        S: AsyncRead + Unpin,
    {
        let mut data = Vec::new();
        let mut chunk = vec![0u8; self.buffer_size];

        loop {
            let n = match tokio::time::timeout(self.read_timeout, stream.read(&mut chunk)).await {
                Ok(result) => result?,
                Err(_) if data.is_empty() => {
                    return Err(ProxyError::Timeout {
                        operation: "client request read",
                        timeout: self.read_timeout,
                    })
                }
                Err(_) => {
                    tracing::debug!(bytes = data.len(), "Request read timed out, using partial request");
                    break;
                }
            };

            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
            if n < self.buffer_size {
                break;
            }
        }

        Ok(RawMessage::new(data))
    }

    /// Read a response from the origin.
    ///
    /// With a declared `Content-Length` the body is read to exactly that
    /// length (surplus bytes are dropped). Without one, reading continues
    /// until the origin closes. A read timeout ends accumulation with the
    /// bytes received so far.
    pub async fn read_response<S>(&self, stream: &mut S) -> Result<RawMessage, ProxyError>
    where
        S: AsyncRead + Unpin,
    {
        let mut data = Vec::new();
        let mut chunk = vec![0u8; self.buffer_size];
        // Total message length once the head declares one.
        let mut expected: Option<usize> = None;
        let mut head_seen = false;

        loop {
            if let Some(total) = expected {
                if data.len() >= total {
                    data.truncate(total);
                    break;
                }
            }

            let n = match tokio::time::timeout(self.read_timeout, stream.read(&mut chunk)).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(
                        bytes = data.len(),
                        expected = ?expected,
                        "Timed out waiting for upstream, delivering partial response"
                    );
                    break;
                }
            };

            if n == 0 {
                if let Some(total) = expected {
                    if data.len() < total {
                        tracing::debug!(
                            bytes = data.len(),
                            expected = total,
                            "Upstream closed before declared length"
                        );
                    }
                }
                break;
            }
            data.extend_from_slice(&chunk[..n]);

            if !head_seen {
                if let Some(end) = find_header_end(&data) {
                    head_seen = true;
                    let body_start = end + HEADER_TERMINATOR.len();
                    expected = HeaderBlock::parse(&data[..end])
                        .content_length()
                        .and_then(|len| body_start.checked_add(len));
                }
            }
        }

        Ok(RawMessage::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn reader(buffer_size: usize) -> MessageReader {
        MessageReader::new(buffer_size, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn request_stops_on_short_read() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client
            .write_all(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n")
            .await
            .unwrap();

        let msg = reader(4096).read_request(&mut server).await.unwrap();
        assert_eq!(msg.as_bytes(), b"GET / HTTP/1.1\r\nHost: a\r\n\r\n");
    }

    #[tokio::test]
    async fn request_reads_full_chunks_until_short_one() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let request = b"GET /abcdefgh HTTP/1.1\r\n\r\n"; // 26 bytes
        client.write_all(request).await.unwrap();

        let msg = reader(8).read_request(&mut server).await.unwrap();
        assert_eq!(msg.as_bytes(), request);
    }

    #[tokio::test]
    async fn empty_request_on_close() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);

        let msg = reader(4096).read_request(&mut server).await.unwrap();
        assert!(msg.is_empty());
    }

    #[tokio::test]
    async fn silent_client_times_out() {
        let (_client, mut server) = tokio::io::duplex(64);
        let err = reader(4096).read_request(&mut server).await.unwrap_err();
        assert!(matches!(err, ProxyError::Timeout { .. }));
    }

    #[tokio::test]
    async fn response_assembled_across_many_reads() {
        let (mut origin, mut proxy) = tokio::io::duplex(16);
        let body = "x".repeat(500);
        let response = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}", body.len(), body);

        let writer = tokio::spawn(async move {
            for piece in response.as_bytes().chunks(7) {
                origin.write_all(piece).await.unwrap();
                tokio::task::yield_now().await;
            }
            // Keep the stream open: framing must stop on length, not EOF.
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let msg = reader(32).read_response(&mut proxy).await.unwrap();
        let (_, got_body) = msg.split().unwrap();
        assert_eq!(got_body.len(), 500);
        writer.abort();
    }

    #[tokio::test]
    async fn response_surplus_bytes_dropped() {
        let (mut origin, mut proxy) = tokio::io::duplex(1024);
        origin
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nabcdef")
            .await
            .unwrap();

        let msg = reader(4096).read_response(&mut proxy).await.unwrap();
        assert_eq!(msg.as_bytes(), b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nabc");
    }

    #[tokio::test]
    async fn response_without_length_reads_to_close() {
        let (mut origin, mut proxy) = tokio::io::duplex(1024);
        tokio::spawn(async move {
            origin.write_all(b"HTTP/1.0 200 OK\r\n\r\nfirst ").await.unwrap();
            origin.write_all(b"second").await.unwrap();
        });

        let msg = reader(4096).read_response(&mut proxy).await.unwrap();
        assert_eq!(msg.as_bytes(), b"HTTP/1.0 200 OK\r\n\r\nfirst second");
    }

    #[tokio::test]
    async fn response_timeout_delivers_partial() {
        let (mut origin, mut proxy) = tokio::io::duplex(1024);
        origin
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial")
            .await
            .unwrap();

        let msg = reader(4096).read_response(&mut proxy).await.unwrap();
        assert!(msg.as_bytes().ends_with(b"partial"));
        drop(origin);
    }

    #[tokio::test]
    async fn malformed_length_reads_to_close() {
        let (mut origin, mut proxy) = tokio::io::duplex(1024);
        tokio::spawn(async move {
            origin
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: nope\r\n\r\nbody")
                .await
                .unwrap();
        });

        let msg = reader(4096).read_response(&mut proxy).await.unwrap();
        assert!(msg.as_bytes().ends_with(b"body"));
    }
}
