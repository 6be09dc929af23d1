//! Whole-body replacement of image responses.

use crate::http::headers::{HeaderBlock, CONTENT_LENGTH, CONTENT_TYPE};
use crate::http::message::RawMessage;
use crate::pool::{ImagePool, PoolError};
use crate::random::Coin;

/// Replace the body with a random pool image.
///
/// Returns `Ok(None)` when the pool is empty or the flip says no. Only
/// `Content-Type` and `Content-Length` change; other headers (caching,
/// ETag and so on) are left as the origin sent them.
pub fn swap_image(
    head: &HeaderBlock,
    pool: &ImagePool,
    probability: f64,
    coin: &mut dyn Coin,
) -> Result<Option<RawMessage>, PoolError> {
    if pool.is_empty() || !coin.flip(probability) {
        return Ok(None);
    }
    let Some(image) = pool.load_random(coin)? else {
        return Ok(None);
    };

    let mut head = head.clone();
    head.set(CONTENT_TYPE, "Content-Type", image.mime.as_str());
    head.set(CONTENT_LENGTH, "Content-Length", &image.bytes.len().to_string());

    Ok(Some(RawMessage::from_parts(&head, &image.bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::ImageEntry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const HEAD: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: image/webp\r\nCache-Control: max-age=3600\r\nContent-Length: 4";

    #[test]
    fn swaps_body_and_framing_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.jpg");
        std::fs::write(&path, b"JPEGBYTES").unwrap();
        let pool = ImagePool::from_entries(vec![ImageEntry::new(path)]);

        let out = swap_image(&HeaderBlock::parse(HEAD), &pool, 1.0, &mut StdRng::seed_from_u64(1))
            .unwrap()
            .unwrap();
        assert_eq!(
            out.as_bytes(),
            b"HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nCache-Control: max-age=3600\r\nContent-Length: 9\r\n\r\nJPEGBYTES"
        );
    }

    #[test]
    fn adds_length_when_origin_sent_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.gif");
        std::fs::write(&path, b"GIF").unwrap();
        let pool = ImagePool::from_entries(vec![ImageEntry::new(path)]);

        let head = HeaderBlock::parse(b"HTTP/1.0 200 OK\r\nContent-Type: image/png");
        let out = swap_image(&head, &pool, 1.0, &mut StdRng::seed_from_u64(1))
            .unwrap()
            .unwrap();
        let (head, body) = out.parts().unwrap();
        assert_eq!(head.content_length(), Some(body.len()));
        assert_eq!(head.get_str(CONTENT_TYPE).unwrap(), "image/gif");
    }

    #[test]
    fn losing_flip_or_empty_pool_is_none() {
        let head = HeaderBlock::parse(HEAD);
        let empty = ImagePool::default();
        assert!(swap_image(&head, &empty, 1.0, &mut StdRng::seed_from_u64(1))
            .unwrap()
            .is_none());

        let pool = ImagePool::from_entries(vec![ImageEntry::new("/irrelevant.png")]);
        assert!(swap_image(&head, &pool, 0.0, &mut StdRng::seed_from_u64(1))
            .unwrap()
            .is_none());
    }

    #[test]
    fn unreadable_image_is_error() {
        let pool = ImagePool::from_entries(vec![ImageEntry::new("/gone.png")]);
        let result = swap_image(&HeaderBlock::parse(HEAD), &pool, 1.0, &mut StdRng::seed_from_u64(1));
        assert!(result.is_err());
    }
}
