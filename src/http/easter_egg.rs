//! Locally synthesized page for the easter-egg host.

use std::sync::Arc;

use crate::pool::{ImagePool, LoadedImage};
use crate::random::Coin;

/// Body served when the pool has nothing to show.
pub const NO_MEMES_BODY: &str = "<h1>No memes found!</h1>";

/// Answers requests for one configured host without contacting any origin.
#[derive(Debug, Clone)]
pub struct EasterEgg {
    host: String,
    pool: Arc<ImagePool>,
}

impl EasterEgg {
    pub fn new(host: impl Into<String>, pool: Arc<ImagePool>) -> Self {
        Self {
            host: host.into(),
            pool,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Exact match against the request's `Host` value.
    pub fn matches(&self, host: &str) -> bool {
        host == self.host
    }

    /// A fully framed `200 OK` HTML response.
    pub fn respond(&self, coin: &mut dyn Coin) -> Vec<u8> {
        let body = match self.pool.load_random(coin) {
            Ok(Some(image)) => render_page(&image),
            Ok(None) => NO_MEMES_BODY.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Easter egg image unreadable, serving fallback page");
                NO_MEMES_BODY.to_string()
            }
        };
        html_response(&body)
    }
}

fn render_page(image: &LoadedImage) -> String {
    format!(
        r#"<html>
    <body style="margin:0; padding:0;">
        <h1 style="text-align:center; margin-top:20px;">Meme Surprise!</h1>
        <img src="{}" style="width:100vw; height:100vh; object-fit: contain;" />
    </body>
</html>
"#,
        image.data_uri()
    )
}

fn html_response(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
    .into_bytes()
}
