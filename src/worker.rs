use tokio::sync::{mpsc::channel, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::FlagClient;
use crate::cache_proxy::CacheProxy;
use crate::transport::Transport;

pub struct Worker {
    cache_task: JoinHandle<()>,
}

impl Worker {
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(transport)))]
    pub(crate) fn new<T: Transport>(transport: T, prefetch: bool) -> (FlagClient, Worker) {
        // Message flow:
        //
        // FlagClient --> CacheProxy --> Transport
        //      ^-----------' (watch)

        let (to_cache_proxy, cache_proxy_rx) = channel(1000);
        let (published, current) = watch::channel(None);

        let client = FlagClient::new(to_cache_proxy, current);
        let cache_proxy = CacheProxy::new(transport, cache_proxy_rx, published);

        let span = tracing::debug_span!("spawned worker");
        let cache_task = tokio::spawn(cache_proxy.execute().instrument(span));

        if prefetch {
            let client = client.clone();
            tokio::spawn(
                async move {
                    client.get_all().await;
                }
                .instrument(tracing::debug_span!("Initial feature flag fetch")),
            );
        }

        (client, Worker { cache_task })
    }

    /// Resolves once every `FlagClient` has been dropped and the cache has
    /// shut down.
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub async fn wait(self) {
        if let Err(e) = self.cache_task.await {
            tracing::trace!(%e, "Feature flag cache task ended with an error");
        }
    }
}
