//! Charset resolution for HTML bodies.

use encoding_rs::{Encoding, UTF_8};

use crate::rewrite::TransformError;

/// The `charset` parameter of a `Content-Type` value, unquoted.
pub fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches(|c| c == '"' || c == '\''))
        } else {
            None
        }
    })
}

/// Encoding named by `content_type`, UTF-8 when none is given.
pub fn resolve(content_type: &str) -> Result<&'static Encoding, TransformError> {
    match charset_param(content_type) {
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| TransformError::UnknownCharset(label.to_string())),
        None => Ok(UTF_8),
    }
}

/// Strict decode: malformed input is an error, not replacement characters.
pub fn decode(encoding: &'static Encoding, body: &[u8]) -> Result<String, TransformError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or(TransformError::Decode(encoding.name()))
}

/// Encode back into the same charset.
pub fn encode(encoding: &'static Encoding, text: &str) -> Result<Vec<u8>, TransformError> {
    let (bytes, used, _) = encoding.encode(text);
    // encoding_rs substitutes UTF-8 for encodings it cannot produce (UTF-16).
    if used != encoding {
        return Err(TransformError::Encode(encoding.name()));
    }
    Ok(bytes.into_owned())
}
