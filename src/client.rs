use std::sync::Arc;

use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::channel as oneshot;
use tokio::sync::watch;
use tracing::Instrument;

use crate::FlagMap;
use crate::cache_proxy::CacheSignal;

/// Handle on the client-side flag cache.
///
/// Every query is fail-open: a key the server did not report, or any query
/// made before the flags arrived, reads as enabled.
#[derive(Clone)]
pub struct FlagClient {
    to_cache_proxy: Sender<CacheSignal>,
    current: watch::Receiver<Option<Arc<FlagMap>>>,
}

impl std::fmt::Debug for FlagClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagClient").finish()
    }
}

impl FlagClient {
    pub(crate) fn new(
        to_cache_proxy: Sender<CacheSignal>,
        current: watch::Receiver<Option<Arc<FlagMap>>>,
    ) -> Self {
        Self {
            to_cache_proxy,
            current,
        }
    }

    /// The flag set, fetched on first use and then kept for the life of the
    /// cache. A failed fetch is cached as an empty set and is not retried
    /// until `reset_cache`.
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub async fn get_all(&self) -> Arc<FlagMap> {
        let (tx, rx) = oneshot();

        if let Err(e) = self
            .to_cache_proxy
            .send(CacheSignal::GetAll(tx))
            .instrument(tracing::trace_span!("requesting flags from the cache proxy"))
            .await
        {
            tracing::warn!(error = ?e, "The feature flag cache is gone, using defaults");
            return Arc::default();
        }

        rx.instrument(tracing::trace_span!("waiting for the flags"))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(%e, "No reply from the feature flag cache, using defaults");
                Arc::default()
            })
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self), ret(level = tracing::Level::TRACE)))]
    pub async fn is_enabled(&self, key: &str) -> bool {
        let flags = self.get_all().await;
        enabled_in(Some(flags.as_ref()), key)
    }

    /// Whatever is cached right now, without waiting for a fetch.
    pub fn is_enabled_now(&self, key: &str) -> bool {
        enabled_in(self.current.borrow().as_deref(), key)
    }

    pub async fn are_enabled<K: AsRef<str>>(&self, keys: &[K], require_all: bool) -> bool {
        let flags = self.get_all().await;
        aggregate(Some(flags.as_ref()), keys, require_all)
    }

    pub fn are_enabled_now<K: AsRef<str>>(&self, keys: &[K], require_all: bool) -> bool {
        aggregate(self.current.borrow().as_deref(), keys, require_all)
    }

    /// Whether a fetch has completed since startup or the last reset.
    pub fn is_loaded(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Forget the cached set. The next `get_all` fetches again.
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub async fn reset_cache(&self) {
        let (tx, rx) = oneshot();

        if let Err(e) = self.to_cache_proxy.send(CacheSignal::Reset(tx)).await {
            tracing::debug!(error = ?e, "The feature flag cache is gone, nothing to reset");
            return;
        }

        if let Err(e) = rx.await {
            tracing::debug!(%e, "No reply to the cache reset");
        }
    }
}

pub(crate) fn enabled_in(flags: Option<&FlagMap>, key: &str) -> bool {
    flags.and_then(|f| f.get(key).copied()).unwrap_or(true)
}

fn aggregate<K: AsRef<str>>(flags: Option<&FlagMap>, keys: &[K], require_all: bool) -> bool {
    let mut states = keys.iter().map(|key| enabled_in(flags, key.as_ref()));

    if require_all {
        states.all(|enabled| enabled)
    } else {
        states.any(|enabled| enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_are_enabled() {
        let flags = FlagMap::from([("a".to_string(), false), ("b".to_string(), true)]);

        assert!(!enabled_in(Some(&flags), "a"));
        assert!(enabled_in(Some(&flags), "b"));
        assert!(enabled_in(Some(&flags), "c"));
        assert!(enabled_in(None, "a"));
    }

    #[test]
    fn aggregation() {
        let flags = FlagMap::from([("a".to_string(), false), ("b".to_string(), true)]);

        assert!(!aggregate(Some(&flags), &["a", "b"], true));
        assert!(aggregate(Some(&flags), &["a", "b"], false));
        assert!(aggregate(Some(&flags), &["b", "unknown"], true));
        assert!(aggregate(None, &["a", "b"], true));
        assert!(!aggregate(Some(&flags), &["a"], false));
    }
}
