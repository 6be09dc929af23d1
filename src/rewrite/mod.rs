//! Response body transformation.
//!
//! # Data Flow
//! ```text
//! RawMessage (complete response)
//!     → split head/body (no separator: pass through)
//!     → Content-Type
//!         text/html → charset.rs decode → html.rs (scanner.rs per tag)
//!                   → encode → Content-Length rewritten
//!         image/*   → image.rs whole-body swap
//!         other     → unchanged
//! ```
//!
//! # Design Decisions
//! - Any failure returns the original response byte for byte
//! - Header order and untouched header lines are preserved
//! - The substitution probability and random source are injected

pub mod charset;
pub mod html;
pub mod image;
pub mod scanner;

use std::sync::Arc;

use thiserror::Error;

use crate::http::headers::{HeaderBlock, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use crate::http::message::RawMessage;
use crate::observability::metrics;
use crate::pool::{ImagePool, PoolError};
use crate::random::Coin;

pub use html::{HtmlRewriter, RewrittenHtml};
pub use scanner::{find_src, AttrSpan, TagScanner, TagSpan};

/// Reasons a transformation was abandoned.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("unknown charset `{0}`")]
    UnknownCharset(String),

    #[error("body is not valid {0}")]
    Decode(&'static str),

    #[error("cannot re-encode body as {0}")]
    Encode(&'static str),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// What happened to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    HtmlRewritten { substitutions: usize },
    ImageSwapped,
    Failed,
}

/// Decides whether and how to rewrite an origin response.
#[derive(Debug, Clone)]
pub struct ResponseTransformer {
    pool: Arc<ImagePool>,
    probability: f64,
}

impl ResponseTransformer {
    pub fn new(pool: Arc<ImagePool>, probability: f64) -> Self {
        Self { pool, probability }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Transform `response`, returning the original on any failure.
    pub fn transform(&self, response: RawMessage, coin: &mut dyn Coin) -> (RawMessage, Outcome) {
        match self.try_transform(&response, coin) {
            Ok(Some((rewritten, outcome))) => (rewritten, outcome),
            Ok(None) => (response, Outcome::Unchanged),
            Err(e) => {
                tracing::warn!(error = %e, "Response transformation failed, passing original through");
                metrics::record_transform_failure();
                (response, Outcome::Failed)
            }
        }
    }

    fn try_transform(
        &self,
        response: &RawMessage,
        coin: &mut dyn Coin,
    ) -> Result<Option<(RawMessage, Outcome)>, TransformError> {
        let Some((head, body)) = response.parts() else {
            return Ok(None);
        };
        let Some(content_type) = head.get_str(CONTENT_TYPE).map(|ct| ct.into_owned()) else {
            return Ok(None);
        };
        // Chunked framing is not understood; rewriting would corrupt it.
        if head.contains(TRANSFER_ENCODING) {
            return Ok(None);
        }

        let media_type = content_type.to_ascii_lowercase();
        if media_type.contains("text/html") {
            return self.transform_html(head, body, &content_type, coin);
        }
        if media_type.trim_start().starts_with("image/") {
            let swapped = image::swap_image(&head, &self.pool, self.probability, coin)?;
            if swapped.is_some() {
                metrics::record_substitutions("image_body", 1);
            }
            return Ok(swapped.map(|msg| (msg, Outcome::ImageSwapped)));
        }

        Ok(None)
    }

    fn transform_html(
        &self,
        mut head: HeaderBlock,
        body: &[u8],
        content_type: &str,
        coin: &mut dyn Coin,
    ) -> Result<Option<(RawMessage, Outcome)>, TransformError> {
        // Compressed bodies cannot be rewritten as text.
        if head
            .get(CONTENT_ENCODING)
            .is_some_and(|enc| !enc.eq_ignore_ascii_case(b"identity"))
        {
            return Ok(None);
        }

        let encoding = charset::resolve(content_type)?;
        let html = charset::decode(encoding, body)?;

        let rewritten = HtmlRewriter::new(&self.pool, self.probability).rewrite(&html, coin);
        if rewritten.substitutions == 0 {
            return Ok(None);
        }

        let new_body = charset::encode(encoding, &rewritten.html)?;
        head.replace(CONTENT_LENGTH, &new_body.len().to_string());
        metrics::record_substitutions("html_tag", rewritten.substitutions);

        Ok(Some((
            RawMessage::from_parts(&head, &new_body),
            Outcome::HtmlRewritten {
                substitutions: rewritten.substitutions,
            },
        )))
    }
}
