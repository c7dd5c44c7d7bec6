//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound every backend exchange with a deadline
//! - Report timeouts as a distinct error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Connect timeouts live in the HTTP connector; this covers the whole exchange
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::error::IngressError;

/// Run `fut`, failing with [`IngressError::BackendTimeout`] after `timeout`.
pub async fn with_timeout<F, T>(backend: &str, timeout: Duration, fut: F) -> Result<T, IngressError>
where
    F: Future<Output = Result<T, IngressError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(IngressError::BackendTimeout {
            backend: backend.to_string(),
            timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_result() {
        let result = with_timeout("http://a:80", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_times_out() {
        let result: Result<(), _> = with_timeout("http://a:80", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(IngressError::BackendTimeout { .. })));
    }
}
