//! Tests for the refresh chains.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Weak};
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use crate::cache::CacheError;
    use crate::workers::{RefreshBackend, Refresher};

    const INTERVAL: Duration = Duration::from_secs(1);

    /// Backend failing every other refresh.
    #[derive(Default)]
    struct FlakyBackend {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RefreshBackend<String> for FlakyBackend {
        async fn on_refresh(&self, key: &String) -> Result<(), CacheError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 1 {
                return Err(CacheError::RefreshFailed {
                    key: key.clone(),
                    source: Arc::new(std::io::Error::new(std::io::ErrorKind::Other, "down")),
                });
            }
            Ok(())
        }
    }

    fn setup() -> (Refresher<String>, Arc<FlakyBackend>, CancellationToken) {
        let token = CancellationToken::new();
        let refresher = Refresher::new(token.clone(), "test".to_string(), INTERVAL);
        (refresher, Arc::new(FlakyBackend::default()), token)
    }

    fn weak(backend: &Arc<FlakyBackend>) -> Weak<dyn RefreshBackend<String>> {
        let backend: Arc<dyn RefreshBackend<String>> = backend.clone();
        Arc::downgrade(&backend)
    }

    /// Test that a chain keeps firing through failures.
    #[tokio::test(start_paused = true)]
    async fn test_chain_survives_failures() {
        let (refresher, backend, _token) = setup();

        assert!(refresher.arm("foo".to_string(), weak(&backend)));
        tokio::time::sleep(Duration::from_millis(4500)).await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
        let (fires, updated, errors) = refresher.counters().snapshot();
        assert_eq!(fires, 4);
        assert_eq!(updated, 2);
        assert_eq!(errors, 2);
        assert_eq!(refresher.armed(), 1);
    }

    /// Test that arming an armed key is refused.
    #[tokio::test(start_paused = true)]
    async fn test_arm_twice_keeps_one_chain() {
        let (refresher, backend, _token) = setup();

        assert!(refresher.arm("foo".to_string(), weak(&backend)));
        assert!(!refresher.arm("foo".to_string(), weak(&backend)));
        assert!(refresher.arm("bar".to_string(), weak(&backend)));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 2, "One fire per key");
        assert_eq!(refresher.armed(), 2);
        assert!(refresher.is_armed(&"foo".to_string()));
    }

    /// Test that close stops the chains and refuses new ones.
    #[tokio::test(start_paused = true)]
    async fn test_close() {
        let (refresher, backend, token) = setup();

        assert!(refresher.arm("foo".to_string(), weak(&backend)));
        refresher.close();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(token.is_cancelled());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(refresher.armed(), 0);
        assert!(!refresher.arm("bar".to_string(), weak(&backend)));
    }

    /// Test that a chain stops once its backend is gone.
    #[tokio::test(start_paused = true)]
    async fn test_chain_stops_without_backend() {
        let (refresher, backend, _token) = setup();

        assert!(refresher.arm("foo".to_string(), weak(&backend)));
        drop(backend);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(refresher.armed(), 0);
        assert_eq!(refresher.counters().snapshot().0, 0);
    }
}
