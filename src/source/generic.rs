use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{FEATURE_FLAGS_VAR, FlagsBlob, OverrideSource};

/// An in-memory environment. Clones share state, so a test can keep a handle
/// and change values under a resolver that owns another clone.
#[derive(Clone, Debug, Default)]
pub struct StaticEnv {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    vars: HashMap<String, String>,
    structured: Option<serde_json::Value>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_var(name, value);
        self
    }

    pub fn set_var(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .vars
            .insert(name.into(), value.into());
    }

    pub fn remove_var(&self, name: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .vars
            .remove(name);
    }

    /// Supply `FEATURE_FLAGS` as an already parsed value. Takes precedence
    /// over a textual `FEATURE_FLAGS` variable.
    pub fn set_structured(&self, value: Option<serde_json::Value>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .structured = value;
    }
}

impl OverrideSource for StaticEnv {
    fn flags_blob(&self) -> Option<FlagsBlob> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(structured) = &inner.structured {
            return Some(FlagsBlob::Structured(structured.clone()));
        }

        inner.vars.get(FEATURE_FLAGS_VAR).cloned().map(FlagsBlob::Text)
    }

    fn var(&self, name: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .vars
            .get(name)
            .cloned()
    }
}
