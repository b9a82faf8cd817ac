//! Tests for load deduplication.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::join_all;

    use crate::singleflight::{Group, LoadAbandoned, Outcome, SharedError};

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    fn counting_load(
        calls: Arc<AtomicUsize>,
        delay: Duration,
        result: Outcome<i32>,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn std::future::Future<Output = Outcome<i32>> + Send>>
    {
        move || {
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                result
            })
        }
    }

    /// Test that concurrent callers share one load and one result.
    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_load() {
        let group: Group<String, i32> = Group::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let results = join_all((0..8).map(|_| {
            group.load(
                "foo".to_string(),
                counting_load(calls.clone(), Duration::from_millis(50), Ok(42)),
            )
        }))
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1, "Loader must run once");
        let leaders = results.iter().filter(|(_, shared)| !shared).count();
        assert_eq!(leaders, 1, "Exactly one caller leads");
        for (outcome, _) in results {
            assert_eq!(outcome.unwrap(), 42);
        }
        assert_eq!(group.in_flight(), 0, "In-flight record must be cleared");
    }

    /// Test that an error reaches the leader and every follower.
    #[tokio::test(start_paused = true)]
    async fn test_error_delivered_to_all_callers() {
        let group: Group<String, i32> = Group::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let err: SharedError = Arc::new(Boom);

        let results = join_all((0..4).map(|_| {
            group.load(
                "foo".to_string(),
                counting_load(calls.clone(), Duration::from_millis(10), Err(err.clone())),
            )
        }))
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for (outcome, _) in results {
            assert_eq!(outcome.unwrap_err().to_string(), "boom");
        }
    }

    /// Test that a later call starts a fresh load once the previous one finished.
    #[tokio::test(start_paused = true)]
    async fn test_sequential_calls_load_again() {
        let group: Group<String, i32> = Group::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (first, shared1) = group
            .load("foo".to_string(), counting_load(calls.clone(), Duration::ZERO, Ok(1)))
            .await;
        let (second, shared2) = group
            .load("foo".to_string(), counting_load(calls.clone(), Duration::ZERO, Ok(2)))
            .await;

        assert_eq!(first.unwrap(), 1);
        assert_eq!(second.unwrap(), 2);
        assert!(!shared1 && !shared2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Test that loads of different keys do not coalesce.
    #[tokio::test(start_paused = true)]
    async fn test_different_keys_load_independently() {
        let group: Group<u32, i32> = Group::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let results = join_all((0..3u32).map(|k| {
            group.load(k, counting_load(calls.clone(), Duration::from_millis(10), Ok(k as i32)))
        }))
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        for (k, (outcome, shared)) in results.into_iter().enumerate() {
            assert_eq!(outcome.unwrap(), k as i32);
            assert!(!shared);
        }
    }

    /// Test that a panicking load releases its followers with an error.
    #[tokio::test(start_paused = true)]
    async fn test_panicking_load_is_abandoned() {
        let group: Group<String, i32> = Group::new();

        let (outcome, _) = group
            .load("foo".to_string(), || async {
                tokio::time::sleep(Duration::from_millis(1)).await;
                let fail = true;
                if fail {
                    panic!("loader panicked");
                }
                Ok::<_, SharedError>(0)
            })
            .await;

        let err = outcome.unwrap_err();
        assert!(err.downcast_ref::<LoadAbandoned>().is_some());
        assert_eq!(group.in_flight(), 0);

        let (retry, _) = group.load("foo".to_string(), || async { Ok::<_, SharedError>(7) }).await;
        assert_eq!(retry.unwrap(), 7);
    }
}
