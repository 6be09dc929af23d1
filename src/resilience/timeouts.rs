//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap socket operations with a deadline
//! - Turn an elapsed deadline into a distinct error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Framing code handles its own read deadlines, since an elapsed read
//!   there means "deliver what we have" rather than failure

use std::future::Future;
use std::time::Duration;

use crate::error::ProxyError;

/// Run an I/O future under `limit`, mapping expiry to [`ProxyError::Timeout`].
pub async fn within<F, T>(operation: &'static str, limit: Duration, fut: F) -> Result<T, ProxyError>
where
    F: Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ProxyError::from),
        Err(_) => Err(ProxyError::Timeout {
            operation,
            timeout: limit,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_success() {
        let value = within("noop", Duration::from_secs(1), async { Ok::<_, std::io::Error>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn expiry_is_timeout_error() {
        let err = within("sleep", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, std::io::Error>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ProxyError::Timeout { operation: "sleep", .. }));
    }
}
