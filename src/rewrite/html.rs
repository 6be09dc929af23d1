//! `<img>` source substitution inside decoded HTML.

use crate::pool::ImagePool;
use crate::random::Coin;
use crate::rewrite::scanner::{find_src, TagScanner};

/// Result of rewriting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenHtml {
    pub html: String,
    pub substitutions: usize,
}

/// Swaps `src` values of `<img>` tags for pool images.
///
/// Every tag gets its own coin flip and its own random image. Tags without
/// a `src`, tags that lose the flip, and tags whose image cannot be read are
/// emitted untouched.
pub struct HtmlRewriter<'a> {
    pool: &'a ImagePool,
    probability: f64,
}

impl<'a> HtmlRewriter<'a> {
    pub fn new(pool: &'a ImagePool, probability: f64) -> Self {
        Self { pool, probability }
    }

    pub fn rewrite(&self, html: &str, coin: &mut dyn Coin) -> RewrittenHtml {
        let mut out = String::with_capacity(html.len());
        let mut substitutions = 0;
        let mut cursor = 0;

        for span in TagScanner::new(html) {
            out.push_str(&html[cursor..span.start]);
            let tag = &html[span.range()];

            match self.rewrite_tag(tag, coin) {
                Some(new_tag) => {
                    out.push_str(&new_tag);
                    substitutions += 1;
                }
                None => out.push_str(tag),
            }
            cursor = span.end;
        }
        out.push_str(&html[cursor..]);

        RewrittenHtml {
            html: out,
            substitutions,
        }
    }

    fn rewrite_tag(&self, tag: &str, coin: &mut dyn Coin) -> Option<String> {
        if self.pool.is_empty() || !coin.flip(self.probability) {
            return None;
        }
        let src = find_src(tag)?;

        let image = match self.pool.load_random(coin) {
            Ok(image) => image?,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping <img> substitution");
                return None;
            }
        };

        let mut new_tag = String::with_capacity(tag.len() + image.bytes.len() * 4 / 3 + 32);
        new_tag.push_str(&tag[..src.value.start]);
        new_tag.push_str(&image.data_uri());
        new_tag.push_str(&tag[src.value.end..]);
        Some(new_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::ImageEntry;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Replays a fixed sequence of flips; picks always return 0.
    struct ScriptedCoin(Vec<bool>);

    impl Coin for ScriptedCoin {
        fn flip(&mut self, _probability: f64) -> bool {
            if self.0.is_empty() {
                false
            } else {
                self.0.remove(0)
            }
        }

        fn pick(&mut self, _len: usize) -> usize {
            0
        }
    }

    fn one_image_pool() -> (tempfile::TempDir, ImagePool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meme.png");
        std::fs::write(&path, b"PNGDATA").unwrap();
        (dir, ImagePool::from_entries(vec![ImageEntry::new(path)]))
    }

    fn data_uri() -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(b"PNGDATA"))
    }

    #[test]
    fn replaces_only_the_src_value() {
        let (_dir, pool) = one_image_pool();
        let html = r#"<p><img class="x" src="http://x/a.png" alt='y'></p>"#;

        let out = HtmlRewriter::new(&pool, 1.0).rewrite(html, &mut ScriptedCoin(vec![true]));
        assert_eq!(out.substitutions, 1);
        assert_eq!(
            out.html,
            format!(r#"<p><img class="x" src="{}" alt='y'></p>"#, data_uri())
        );
    }

    #[test]
    fn each_tag_flips_independently() {
        let (_dir, pool) = one_image_pool();
        let html = r#"<img src="1"><img src="2"><img src="3">"#;

        let out = HtmlRewriter::new(&pool, 0.5)
            .rewrite(html, &mut ScriptedCoin(vec![false, true, false]));
        assert_eq!(out.substitutions, 1);
        assert_eq!(
            out.html,
            format!(r#"<img src="1"><img src="{}"><img src="3">"#, data_uri())
        );
    }

    #[test]
    fn tags_without_src_untouched() {
        let (_dir, pool) = one_image_pool();
        let html = r#"<img alt="none"><img data-src="lazy">"#;
        let out = HtmlRewriter::new(&pool, 1.0).rewrite(html, &mut ScriptedCoin(vec![true, true]));
        assert_eq!(out.substitutions, 0);
        assert_eq!(out.html, html);
    }

    #[test]
    fn empty_pool_leaves_document_alone() {
        let pool = ImagePool::default();
        let html = r#"<img src="a.png">"#;
        let out = HtmlRewriter::new(&pool, 1.0).rewrite(html, &mut StdRng::seed_from_u64(3));
        assert_eq!(out.html, html);
    }

    #[test]
    fn unreadable_image_keeps_original_tag() {
        let pool = ImagePool::from_entries(vec![ImageEntry::new("/nope/gone.png")]);
        let html = r#"<img src="a.png"> and <img src="b.png">"#;
        let out = HtmlRewriter::new(&pool, 1.0).rewrite(html, &mut StdRng::seed_from_u64(3));
        assert_eq!(out.html, html);
        assert_eq!(out.substitutions, 0);
    }

    #[test]
    fn malformed_fragments_survive() {
        let (_dir, pool) = one_image_pool();
        let html = "<img <img src=\"a\" <b>text</b> <img src=\"unterminated";
        let out = HtmlRewriter::new(&pool, 1.0).rewrite(html, &mut StdRng::seed_from_u64(9));
        assert_eq!(TagScanner::new(&out.html).count(), TagScanner::new(html).count());
        assert!(out.html.ends_with("<img src=\"unterminated"));
    }

    #[test]
    fn tag_count_preserved() {
        let (_dir, pool) = one_image_pool();
        let html = r#"<IMG SRC="a"><img src='b'><img><img src=c>"#;
        let out = HtmlRewriter::new(&pool, 0.5).rewrite(html, &mut StdRng::seed_from_u64(11));
        assert_eq!(TagScanner::new(&out.html).count(), 4);
        for span in TagScanner::new(&out.html) {
            let tag = &out.html[span.range()];
            if let Some(src) = find_src(tag) {
                let value = &tag[src.value];
                assert!(["a", "b", "c"].contains(&value) || value == data_uri());
            }
        }
    }
}
