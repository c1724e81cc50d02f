use std::collections::HashMap;

use crate::coerce::{coerce_json_value, parse_env_boolean};
use crate::registry::Registry;
use crate::source::{FlagsBlob, OverrideSource};

pub(crate) type Overrides = HashMap<String, bool>;

#[derive(thiserror::Error, Debug)]
pub(crate) enum BlobError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Collect the overrides for every known key.
///
/// A usable `FEATURE_FLAGS` blob decides the whole override set on its own;
/// per-key variables are only consulted when there is no blob or it cannot
/// be parsed.
#[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip_all))]
pub(crate) fn read_overrides<S: OverrideSource + ?Sized>(
    registry: &Registry,
    source: &S,
) -> Overrides {
    if let Some(blob) = source.flags_blob() {
        match overrides_from_blob(registry, blob) {
            Ok(Some(overrides)) => return overrides,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    %e,
                    "Failed to parse FEATURE_FLAGS, falling back to individual FEATURE_FLAG_* variables"
                );
            }
        }
    }

    overrides_from_vars(registry, source)
}

fn overrides_from_blob(registry: &Registry, blob: FlagsBlob) -> Result<Option<Overrides>, BlobError> {
    let value = match blob {
        FlagsBlob::Text(text) if text.trim().is_empty() => return Ok(None),
        FlagsBlob::Text(text) => serde_json::from_str(&text)?,
        FlagsBlob::Structured(value) => value,
    };

    let map = match value {
        serde_json::Value::Object(map) => map,
        other => return Err(BlobError::NotAnObject(json_kind(&other))),
    };

    let mut overrides = Overrides::new();

    for (key, value) in map.iter() {
        if !registry.contains(key) {
            tracing::trace!(%key, "Ignoring an override for an unknown feature key");
            continue;
        }

        if let Some(enabled) = coerce_json_value(value, true) {
            overrides.insert(key.clone(), enabled);
        }
    }

    Ok(Some(overrides))
}

fn overrides_from_vars<S: OverrideSource + ?Sized>(registry: &Registry, source: &S) -> Overrides {
    registry
        .descriptors()
        .iter()
        .filter_map(|descriptor| {
            let value = source.var(&descriptor.env_var_name())?;
            Some((descriptor.key.clone(), parse_env_boolean(&value, true)))
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
