//! Loader contract: where cache values come from.

use std::future::Future;

/// Boxed loader error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Loader fetches the value for a key.
///
/// It may be slow and may fail. The cache never calls it concurrently for the
/// same key, but different keys are loaded in parallel.
#[async_trait::async_trait]
pub trait Loader<K, V>: Send + Sync {
    async fn load(&self, key: &K) -> Result<V, BoxError>;
}

/// Loader backed by an async function.
pub struct FnLoader<F> {
    f: F,
}

/// Wraps an async function taking the key by value into a [`Loader`].
///
/// ```ignore
/// let loader = loader::from_fn(|key: String| async move {
///     fetch(&key).await
/// });
/// ```
pub fn from_fn<F>(f: F) -> FnLoader<F> {
    FnLoader { f }
}

#[async_trait::async_trait]
impl<K, V, E, F, Fut> Loader<K, V> for FnLoader<F>
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
    E: Into<BoxError> + 'static,
    F: Fn(K) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    async fn load(&self, key: &K) -> Result<V, BoxError> {
        (self.f)(key.clone()).await.map_err(Into::into)
    }
}
