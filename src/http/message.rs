//! Raw HTTP messages as they travel over the wire.

use crate::http::headers::HeaderBlock;

/// Blank line separating head from body.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Offset of the first `\r\n\r\n`, if any.
pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    memchr::memmem::find(buf, HEADER_TERMINATOR)
}

/// One complete request or response: start line, headers, body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMessage {
    bytes: Vec<u8>,
}

impl RawMessage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Assemble a message from a (possibly rewritten) head and a body.
    pub fn from_parts(head: &HeaderBlock, body: &[u8]) -> Self {
        let mut bytes = head.to_bytes();
        bytes.extend_from_slice(HEADER_TERMINATOR);
        bytes.extend_from_slice(body);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Head (without the separator) and body, split at the first blank line.
    pub fn split(&self) -> Option<(&[u8], &[u8])> {
        let end = find_header_end(&self.bytes)?;
        Some((&self.bytes[..end], &self.bytes[end + HEADER_TERMINATOR.len()..]))
    }

    /// Parsed head and raw body.
    pub fn parts(&self) -> Option<(HeaderBlock, &[u8])> {
        self.split().map(|(head, body)| (HeaderBlock::parse(head), body))
    }
}

impl From<Vec<u8>> for RawMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
