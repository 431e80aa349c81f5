use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};

/// Lifetime of a page's in-flight requests.
///
/// A page owns one scope; tearing the page down cancels it, and any request
/// still running under [`FetchScope::run`] resolves to [`AppError::Cancelled`]
/// instead of delivering a stale result.
#[derive(Debug, Clone, Default)]
pub struct FetchScope {
    token: CancellationToken,
}

impl FetchScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope cancelled together with this one (but not the other way round)
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Runs `fut` unless the scope is cancelled first
    pub async fn run<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        if self.token.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(AppError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let scope = FetchScope::new();
        let value = assert_ok!(scope.run(async { Ok::<_, AppError>(42) }).await);
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_cancelled_scope_short_circuits() {
        let scope = FetchScope::new();
        scope.cancel();

        let result = scope.run(async { Ok::<_, AppError>(1) }).await;
        assert!(matches!(assert_err!(result), AppError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_in_flight_work() {
        let scope = FetchScope::new();
        let canceller = scope.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, AppError>(())
            })
            .await;

        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_child_follows_parent() {
        let parent = FetchScope::new();
        let child = parent.child();

        child.cancel();
        assert!(!parent.is_cancelled());

        let other = parent.child();
        parent.cancel();
        assert!(other.is_cancelled());
    }
}
