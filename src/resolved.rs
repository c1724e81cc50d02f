use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::overrides::Overrides;
use crate::registry::Registry;

/// Every known key mapped to its effective state, in registry order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFlagSet {
    entries: Vec<(String, bool)>,
    resolved_at: DateTime<Utc>,
}

impl ResolvedFlagSet {
    pub(crate) fn resolve(registry: &Registry, overrides: &Overrides) -> Self {
        let entries = registry
            .descriptors()
            .iter()
            .map(|d| {
                let enabled = overrides.get(&d.key).copied().unwrap_or(d.default_enabled);
                (d.key.clone(), enabled)
            })
            .collect();

        Self {
            entries,
            resolved_at: Utc::now(),
        }
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, enabled)| *enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    pub fn enabled(&self) -> Vec<String> {
        self.filtered(true)
    }

    pub fn disabled(&self) -> Vec<String> {
        self.filtered(false)
    }

    fn filtered(&self, state: bool) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, enabled)| *enabled == state)
            .map(|(k, _)| k.clone())
            .collect()
    }
}

/// Serializes as a flat `{"key": bool}` object; `resolved_at` is left out.
impl Serialize for ResolvedFlagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, enabled) in &self.entries {
            map.serialize_entry(key, enabled)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Category, FeatureDescriptor};

    #[test]
    fn keeps_registry_order_and_serializes_flat() {
        let registry = Registry::new([
            FeatureDescriptor::new("z", true, "", Category::Layout),
            FeatureDescriptor::new("a", false, "", Category::Layout),
        ]);
        let overrides = Overrides::from([("a".to_string(), true), ("ghost".to_string(), true)]);

        let set = ResolvedFlagSet::resolve(&registry, &overrides);

        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(set.get("ghost"), None);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"{"z":true,"a":true}"#);
    }
}
