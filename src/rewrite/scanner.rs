//! Locating `<img>` tags and their `src` attribute.
//!
//! Tag discovery and attribute parsing are separate so each can be tested
//! on its own; neither ever fails, malformed input simply yields no match.

use std::ops::Range;

/// Byte span of one `<img ...>` tag within a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    pub start: usize,
    /// Exclusive; points just past the closing `>`.
    pub end: usize,
}

impl TagSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Iterator over `<img` tags, case-insensitive.
///
/// A tag runs from `<img` to the first following `>`. An unterminated tag
/// at the end of the document is not reported.
pub struct TagScanner<'a> {
    html: &'a str,
    pos: usize,
}

impl<'a> TagScanner<'a> {
    pub fn new(html: &'a str) -> Self {
        Self { html, pos: 0 }
    }
}

impl Iterator for TagScanner<'_> {
    type Item = TagSpan;

    fn next(&mut self) -> Option<TagSpan> {
        let bytes = self.html.as_bytes();

        while self.pos < bytes.len() {
            let open = self.pos + memchr::memchr(b'<', &bytes[self.pos..])?;

            if !is_img_open(bytes, open) {
                self.pos = open + 1;
                continue;
            }

            let Some(close) = memchr::memchr(b'>', &bytes[open..]) else {
                self.pos = bytes.len();
                return None;
            };
            let end = open + close + 1;
            self.pos = end;
            return Some(TagSpan { start: open, end });
        }
        None
    }
}

/// `<img` followed by whitespace, `/`, `>` or end of input.
fn is_img_open(bytes: &[u8], open: usize) -> bool {
    let name = match bytes.get(open + 1..open + 4) {
        Some(name) => name,
        None => return false,
    };
    if !name.eq_ignore_ascii_case(b"img") {
        return false;
    }
    match bytes.get(open + 4) {
        None => true,
        Some(b) => b.is_ascii_whitespace() || *b == b'/' || *b == b'>',
    }
}

/// Location of an attribute value inside a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSpan {
    /// Value bytes, excluding any quotes.
    pub value: Range<usize>,
}

/// Find the first `src` attribute in a single tag.
///
/// Accepts double-quoted, single-quoted and unquoted values. An
/// unterminated quote stops the search.
pub fn find_src(tag: &str) -> Option<AttrSpan> {
    find_attr(tag, "src")
}

fn find_attr(tag: &str, wanted: &str) -> Option<AttrSpan> {
    let b = tag.as_bytes();
    // Skip `<` and the tag name.
    let mut i = 1;
    while i < b.len() && !is_attr_break(b[i]) {
        i += 1;
    }

    loop {
        while i < b.len() && (b[i].is_ascii_whitespace() || b[i] == b'/') {
            i += 1;
        }
        if i >= b.len() || b[i] == b'>' {
            return None;
        }

        let name_start = i;
        while i < b.len() && !is_attr_break(b[i]) && b[i] != b'=' {
            i += 1;
        }
        let name = &b[name_start..i];

        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= b.len() || b[i] != b'=' {
            // Boolean attribute, no value.
            continue;
        }
        i += 1;
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= b.len() {
            return None;
        }

        let span = match b[i] {
            q @ (b'"' | b'\'') => {
                let start = i + 1;
                let len = memchr::memchr(q, &b[start..])?;
                i = start + len + 1;
                AttrSpan {
                    value: start..start + len,
                }
            }
            _ => {
                let start = i;
                while i < b.len() && !b[i].is_ascii_whitespace() && b[i] != b'>' {
                    i += 1;
                }
                AttrSpan { value: start..i }
            }
        };

        if name.eq_ignore_ascii_case(wanted.as_bytes()) {
            return Some(span);
        }
    }
}

fn is_attr_break(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}
