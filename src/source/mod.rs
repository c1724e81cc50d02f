mod generic;
mod process;

pub use generic::StaticEnv;
pub use process::ProcessEnv;

pub(crate) const FEATURE_FLAGS_VAR: &str = "FEATURE_FLAGS";

/// The `FEATURE_FLAGS` override, either still as text or already structured
/// by whatever loaded it.
#[derive(Clone, Debug, PartialEq)]
pub enum FlagsBlob {
    Text(String),
    Structured(serde_json::Value),
}

/// Where deploy-time overrides come from.
///
/// Implementations are read on every uncached resolution and must not cache
/// on their own.
pub trait OverrideSource: Send + Sync + 'static {
    fn flags_blob(&self) -> Option<FlagsBlob>;

    fn var(&self, name: &str) -> Option<String>;
}

impl<S: OverrideSource> OverrideSource for std::sync::Arc<S> {
    fn flags_blob(&self) -> Option<FlagsBlob> {
        (**self).flags_blob()
    }

    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}
