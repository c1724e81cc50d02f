use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::oneshot::Sender as OneshotSender;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::FlagMap;
use crate::transport::{Transport, fetch_all};

#[derive(Debug)]
pub(crate) enum CacheSignal {
    GetAll(OneshotSender<Arc<FlagMap>>),
    Reset(OneshotSender<()>),
}

/// One fetch and everybody waiting on it.
struct InFlight {
    fetch: JoinHandle<FlagMap>,
    waiters: Vec<OneshotSender<Arc<FlagMap>>>,
}

impl InFlight {
    fn reply(self, flags: &Arc<FlagMap>) {
        for waiter in self.waiters {
            if waiter.send(flags.clone()).is_err() {
                tracing::trace!("A feature flag waiter hung up before the fetch finished");
            }
        }
    }

    /// Finish a fetch that no longer feeds the cache.
    async fn settle_detached(mut self) {
        let flags = Arc::new(joined_flags((&mut self.fetch).await));
        self.reply(&flags);
    }
}

fn joined_flags(joined: Result<FlagMap, tokio::task::JoinError>) -> FlagMap {
    joined.unwrap_or_else(|e| {
        tracing::warn!(%e, "The feature flag fetch task failed, using defaults");
        FlagMap::new()
    })
}

/// Owns the client-side cache. Requests made while a fetch is running join
/// that fetch instead of starting another.
pub(crate) struct CacheProxy<T: Transport> {
    transport: T,
    incoming: mpsc::Receiver<CacheSignal>,
    published: watch::Sender<Option<Arc<FlagMap>>>,
    cached: Option<Arc<FlagMap>>,
}

impl<T: Transport> CacheProxy<T> {
    pub(crate) fn new(
        transport: T,
        incoming: mpsc::Receiver<CacheSignal>,
        published: watch::Sender<Option<Arc<FlagMap>>>,
    ) -> Self {
        Self {
            transport,
            incoming,
            published,
            cached: None,
        }
    }

    #[tracing::instrument(skip(self))]
    pub(crate) async fn execute(mut self) {
        let mut in_flight: Option<InFlight> = None;

        loop {
            tokio::select! {
                biased;
                joined = async {
                    match in_flight.as_mut() {
                        Some(pending) => (&mut pending.fetch).await,
                        None => std::future::pending().await,
                    }
                }, if in_flight.is_some() => {
                    let flags = Arc::new(joined_flags(joined));
                    self.store(Some(flags.clone()));

                    if let Some(pending) = in_flight.take() {
                        pending.reply(&flags);
                    }
                },
                signal = self.incoming.recv() => {
                    let Some(signal) = signal else {
                        tracing::debug!("Feature flag clients hung up, shutting down");

                        if let Some(pending) = in_flight.take() {
                            pending.fetch.abort();
                        }

                        return;
                    };

                    match signal {
                        CacheSignal::GetAll(reply) => {
                            self.handle_message_get_all(reply, &mut in_flight);
                        }
                        CacheSignal::Reset(reply) => {
                            self.handle_message_reset(reply, &mut in_flight);
                        }
                    }
                },
            }
        }
    }

    fn handle_message_get_all(
        &self,
        reply: OneshotSender<Arc<FlagMap>>,
        in_flight: &mut Option<InFlight>,
    ) {
        if let Some(cached) = &self.cached {
            if reply.send(cached.clone()).is_err() {
                tracing::trace!("A feature flag waiter hung up before we replied");
            }
            return;
        }

        if let Some(pending) = in_flight.as_mut() {
            tracing::trace!(
                waiters = pending.waiters.len() + 1,
                "Joining the running feature flag fetch"
            );
            pending.waiters.push(reply);
            return;
        }

        let transport = self.transport.clone();
        let fetch = tokio::spawn(
            async move { fetch_all(&transport).await }
                .instrument(tracing::debug_span!("fetching feature flags")),
        );

        *in_flight = Some(InFlight {
            fetch,
            waiters: vec![reply],
        });
    }

    fn handle_message_reset(&mut self, reply: OneshotSender<()>, in_flight: &mut Option<InFlight>) {
        self.store(None);

        if let Some(pending) = in_flight.take() {
            tokio::spawn(
                pending
                    .settle_detached()
                    .instrument(tracing::debug_span!("settling a superseded fetch")),
            );
        }

        if reply.send(()).is_err() {
            tracing::trace!("The reset requester hung up before we replied");
        }
    }

    fn store(&mut self, flags: Option<Arc<FlagMap>>) {
        self.cached = flags.clone();
        self.published.send_replace(flags);
    }
}
