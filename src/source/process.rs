use super::{FEATURE_FLAGS_VAR, FlagsBlob, OverrideSource};

/// Overrides read from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl OverrideSource for ProcessEnv {
    fn flags_blob(&self) -> Option<FlagsBlob> {
        self.var(FEATURE_FLAGS_VAR).map(FlagsBlob::Text)
    }

    fn var(&self, name: &str) -> Option<String> {
        match std::env::var(name) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(e @ std::env::VarError::NotUnicode(_)) => {
                tracing::warn!(name, %e, "Ignoring a feature flag override that is not valid unicode");
                None
            }
        }
    }
}
