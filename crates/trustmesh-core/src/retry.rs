//! Retrying the error kinds that are transient by nature: a flaky
//! network call, a stalled request, a momentarily unreachable KMS, or
//! audit log contention. Every other error kind is permanent from a
//! retry's point of view and is returned on the first attempt.

use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

use crate::{Error, ErrorKind};

const MAX_ATTEMPTS: u32 = 3;

fn is_transient(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::NetworkError | ErrorKind::Timeout | ErrorKind::KmsUnavailable | ErrorKind::LogBusy)
}

/// Runs `operation` up to [`MAX_ATTEMPTS`] times, backing off
/// exponentially (100ms base, doubling, +/-20% jitter) between attempts
/// that fail with a transient [`ErrorKind`]. A non-transient failure, or
/// exhausting all attempts, returns that failure immediately.
pub async fn retry<T, F, Fut>(mut operation: F) -> crate::Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = crate::Result<T>>,
{
    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(100))
        .with_randomization_factor(0.2)
        .with_max_elapsed_time(None)
        .build();

    let mut attempts = 0;
    backoff::future::retry(backoff, || {
        attempts += 1;
        let attempt = attempts;
        let fut = operation();
        async move {
            fut.await.map_err(|e| {
                if attempt < MAX_ATTEMPTS && is_transient(e.kind()) {
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry(|| async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(Error::NetworkError("connection reset".into()))
            } else {
                Ok(42)
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: crate::Result<()> = retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::NetworkError("connection reset".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);
        let result: crate::Result<()> = retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::MalformedInput("bad input".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
