//! Render-time bindings over [`FlagClient`].
//!
//! A watch starts from whatever is cached (enabled if nothing is), then
//! settles exactly once against the fetched set. After settling its value
//! is fixed for the rest of the session.

use crate::FlagClient;

#[derive(Clone, Debug)]
pub struct FlagWatch {
    client: FlagClient,
    key: String,
    value: bool,
    settled: bool,
}

impl FlagWatch {
    pub fn new(client: &FlagClient, key: impl Into<String>) -> Self {
        let key = key.into();

        Self {
            value: client.is_enabled_now(&key),
            client: client.clone(),
            key,
            settled: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Resolve against the fetched set. Returns `true` when the value
    /// changed and the caller should render again; later calls return
    /// `false` without touching the client.
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self), fields(key = %self.key)))]
    pub async fn settle(&mut self) -> bool {
        if self.settled {
            return false;
        }

        let resolved = self.client.is_enabled(&self.key).await;
        self.settled = true;

        let changed = resolved != self.value;
        self.value = resolved;
        changed
    }
}

/// Several flags combined with AND (`require_all`) or OR.
///
/// The initial value is the AND of the cached states whichever way the
/// watch aggregates; `require_all` only applies once it settles.
#[derive(Clone, Debug)]
pub struct FlagsWatch {
    client: FlagClient,
    keys: Vec<String>,
    require_all: bool,
    value: bool,
    settled: bool,
}

impl FlagsWatch {
    pub fn new<K: Into<String>>(
        client: &FlagClient,
        keys: impl IntoIterator<Item = K>,
        require_all: bool,
    ) -> Self {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();

        Self {
            value: client.are_enabled_now(&keys, true),
            client: client.clone(),
            keys,
            require_all,
            settled: false,
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Same contract as [`FlagWatch::settle`].
    pub async fn settle(&mut self) -> bool {
        if self.settled {
            return false;
        }

        let resolved = self.client.are_enabled(&self.keys, self.require_all).await;
        self.settled = true;

        let changed = resolved != self.value;
        self.value = resolved;
        changed
    }
}

/// Pick a branch.
pub fn gate<R>(enabled: bool, on: impl FnOnce() -> R, off: impl FnOnce() -> R) -> R {
    if enabled { on() } else { off() }
}

/// Pick `on`, or render nothing.
pub fn gate_or_default<R: Default>(enabled: bool, on: impl FnOnce() -> R) -> R {
    gate(enabled, on, R::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gating() {
        assert_eq!(gate(true, || "slider", || "placeholder"), "slider");
        assert_eq!(gate(false, || "slider", || "placeholder"), "placeholder");
        assert_eq!(gate_or_default(false, || String::from("ticker")), "");
        assert_eq!(gate_or_default(true, || vec![1, 2]), vec![1, 2]);
    }
}
