//! Ordered header block with case-insensitive lookup.
//!
//! Lines are kept as raw bytes so that untouched headers are emitted exactly
//! as received. Rewriting replaces values in place and never reorders.

use std::borrow::Cow;

pub const CONTENT_LENGTH: &str = "content-length";
pub const CONTENT_TYPE: &str = "content-type";
pub const CONTENT_ENCODING: &str = "content-encoding";
pub const TRANSFER_ENCODING: &str = "transfer-encoding";
pub const HOST: &str = "host";

const CRLF: &[u8] = b"\r\n";

/// Start line plus header lines of one HTTP message, without the blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    start_line: Vec<u8>,
    lines: Vec<Vec<u8>>,
}

impl HeaderBlock {
    /// Split a head (everything before `\r\n\r\n`) into lines.
    pub fn parse(head: &[u8]) -> Self {
        let mut parts = split_crlf(head).into_iter();
        let start_line = parts.next().unwrap_or_default().to_vec();
        let lines = parts.map(|l| l.to_vec()).collect();
        Self { start_line, lines }
    }

    pub fn start_line(&self) -> &[u8] {
        &self.start_line
    }

    /// Value of the first header named `name`, trimmed.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.lines.iter().find_map(|line| match split_field(line) {
            Some((field, value)) if field.eq_ignore_ascii_case(name.as_bytes()) => Some(value.trim_ascii()),
            _ => None,
        })
    }

    /// Lossy text view of [`HeaderBlock::get`].
    pub fn get_str(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(String::from_utf8_lossy)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declared `Content-Length`; malformed values count as undeclared.
    pub fn content_length(&self) -> Option<usize> {
        std::str::from_utf8(self.get(CONTENT_LENGTH)?).ok()?.parse().ok()
    }

    /// Replace the value of every header named `name`, keeping its position
    /// and original name spelling. Returns whether any header matched.
    pub fn replace(&mut self, name: &str, value: &str) -> bool {
        let mut found = false;
        for line in &mut self.lines {
            let field = match split_field(line.as_slice()) {
                Some((field, _)) if field.eq_ignore_ascii_case(name.as_bytes()) => field.to_vec(),
                _ => continue,
            };
            *line = render_field(&field, value);
            found = true;
        }
        found
    }

    /// Replace `name` if present, otherwise append it after the last header.
    pub fn set(&mut self, name: &str, canonical: &str, value: &str) {
        if !self.replace(name, value) {
            self.lines.push(render_field(canonical.as_bytes(), value));
        }
    }

    /// Serialize back to the head bytes (no trailing blank line).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.start_line.clone();
        for line in &self.lines {
            out.extend_from_slice(CRLF);
            out.extend_from_slice(line);
        }
        out
    }
}

fn render_field(name: &[u8], value: &str) -> Vec<u8> {
    let mut line = name.to_vec();
    line.extend_from_slice(b": ");
    line.extend_from_slice(value.as_bytes());
    line
}

fn split_field(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let colon = line.iter().position(|&b| b == b':')?;
    Some((line[..colon].trim_ascii_end(), &line[colon + 1..]))
}

fn split_crlf(bytes: &[u8]) -> Vec<&[u8]> {
    let mut parts = Vec::new();
    let mut rest = bytes;
    while let Some(pos) = memchr::memmem::find(rest, CRLF) {
        parts.push(&rest[..pos]);
        rest = &rest[pos + CRLF.len()..];
    }
    parts.push(rest);
    parts
}
