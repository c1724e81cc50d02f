use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::overrides::read_overrides;
use crate::registry::{Category, FeatureDescriptor, Registry};
use crate::resolved::ResolvedFlagSet;
use crate::source::{OverrideSource, ProcessEnv};

/// Server-side flag resolution.
///
/// A server builds one resolver at startup and shares it (see
/// [`FlagResolver::for_process`]); each instance owns its own cache, so tests
/// construct isolated ones. The merged set is computed on first use and cached until `reset_cache` or
/// a forced refresh. Resolution never fails: unusable overrides are logged
/// and ignored.
pub struct FlagResolver<S: OverrideSource = ProcessEnv> {
    registry: Registry,
    source: S,
    cache: RwLock<Option<Arc<ResolvedFlagSet>>>,
}

impl<S: OverrideSource> std::fmt::Debug for FlagResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagResolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl FlagResolver<ProcessEnv> {
    /// The site's descriptor table read against the real environment. Its
    /// cache lives as long as the resolver.
    pub fn for_process() -> Self {
        Self::new(Registry::elevate_ballers(), ProcessEnv)
    }
}

impl<S: OverrideSource> FlagResolver<S> {
    pub fn new(registry: Registry, source: S) -> Self {
        Self {
            registry,
            source,
            cache: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub fn resolve_all(&self, force_refresh: bool) -> Arc<ResolvedFlagSet> {
        if !force_refresh {
            if let Some(cached) = self.cached() {
                return cached;
            }
        }

        let overrides = read_overrides(&self.registry, &self.source);
        let resolved = Arc::new(ResolvedFlagSet::resolve(&self.registry, &overrides));

        tracing::debug!(
            force_refresh,
            overrides = overrides.len(),
            enabled = resolved.enabled().len(),
            resolved_at = %resolved.resolved_at(),
            "Resolved feature flags"
        );

        // Concurrent resolutions read the same source, so last write wins.
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(resolved.clone());

        resolved
    }

    /// Unknown keys are disabled.
    pub fn is_enabled(&self, key: &str) -> bool {
        self.resolve_all(false).get(key).unwrap_or(false)
    }

    /// With `require_all`, every key must be enabled; otherwise any one will
    /// do. Unknown keys count as disabled.
    pub fn are_enabled<K: AsRef<str>>(&self, keys: &[K], require_all: bool) -> bool {
        let resolved = self.resolve_all(false);
        let mut states = keys
            .iter()
            .map(|key| resolved.get(key.as_ref()).unwrap_or(false));

        if require_all {
            states.all(|enabled| enabled)
        } else {
            states.any(|enabled| enabled)
        }
    }

    pub fn list_enabled(&self) -> Vec<String> {
        self.resolve_all(false).enabled()
    }

    pub fn list_disabled(&self) -> Vec<String> {
        self.resolve_all(false).disabled()
    }

    /// Descriptors by category, for display. `default_enabled` carries the
    /// live resolved state rather than the static default.
    pub fn group_by_category(&self) -> BTreeMap<Category, Vec<FeatureDescriptor>> {
        let resolved = self.resolve_all(false);
        let mut groups: BTreeMap<Category, Vec<FeatureDescriptor>> = BTreeMap::new();

        for descriptor in self.registry.descriptors() {
            let mut shown = descriptor.clone();
            shown.default_enabled = resolved.get(&descriptor.key).unwrap_or(descriptor.default_enabled);
            groups.entry(descriptor.category).or_default().push(shown);
        }

        groups
    }

    pub fn reset_cache(&self) {
        tracing::debug!("Clearing the resolved feature flag cache");
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn cached(&self) -> Option<Arc<ResolvedFlagSet>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
