use std::{future::Future, path::PathBuf, time::Duration};

use reqwest::Certificate;
use url::Url;

use crate::FlagMap;

mod file;
mod http;

pub use file::{FileTransport, FileTransportError};
pub use http::{ReqwestTransport, ReqwestTransportError};

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// How the client obtains the server's resolved flag set.
pub trait Transport: Send + Sync + Clone + 'static {
    type Error: std::error::Error + Send;

    fn fetch_flags(&self) -> impl Future<Output = Result<FlagMap, Self::Error>> + Send;
}

/// Fetch the flag set once. Any failure is logged and yields an empty map,
/// which callers read as "every key falls back to its default".
#[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip_all))]
pub async fn fetch_all<T: Transport>(transport: &T) -> FlagMap {
    match transport.fetch_flags().await {
        Ok(flags) => {
            tracing::trace!(count = flags.len(), "Fetched feature flags");
            flags
        }
        Err(e) => {
            tracing::warn!(%e, "Failed to fetch feature flags, using defaults");
            FlagMap::new()
        }
    }
}

#[derive(Clone, Debug)]
pub enum Transports {
    None,
    File(FileTransport),
    Http(ReqwestTransport),
}

impl Transports {
    pub fn none() -> Self {
        Transports::None
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(err(level = tracing::Level::TRACE)))]
    pub fn try_new(
        opt_value: Option<String>,
        timeout: Duration,
        certificates: Option<Certificate>,
        proxy: Option<Url>,
    ) -> Result<Self, TransportsError> {
        let Some(value) = opt_value else {
            return Ok(Self::None);
        };

        let url = match Url::parse(&value) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                tracing::debug!(path = %value, "Endpoint is not a URL, reading it as a snapshot path");
                return Ok(Transports::File(FileTransport::new(PathBuf::from(value))));
            }
            Err(e) => return Err(e.into()),
        };

        match url.scheme() {
            "https" | "http" => Ok(Transports::Http(http::ReqwestTransport::new(
                url,
                timeout,
                certificates,
                proxy,
            )?)),
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| TransportsError::FilePath(url.clone()))?;
                Ok(Transports::File(FileTransport::new(path)))
            }
            _ => Err(TransportsError::UnknownUrlScheme),
        }
    }
}

impl Transport for Transports {
    type Error = TransportsError;

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip_all, ret(level = tracing::Level::TRACE)))]
    async fn fetch_flags(&self) -> Result<FlagMap, Self::Error> {
        match self {
            Self::None => Ok(FlagMap::new()),
            Self::File(t) => Ok(t.fetch_flags().await?),
            Self::Http(t) => Ok(t.fetch_flags().await?),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TransportsError {
    #[error(transparent)]
    FileError(#[from] file::FileTransportError),

    #[error(transparent)]
    HttpError(#[from] http::ReqwestTransportError),

    #[error("Only http, https, and file URL schemes are supported.")]
    UnknownUrlScheme,

    #[error(transparent)]
    Parse(#[from] url::ParseError),

    #[error("`{0}` does not name a local file")]
    FilePath(Url),

    #[error("Read path `{0}`")]
    Read(std::path::PathBuf, #[source] std::io::Error),

    #[error("Unknown certificate format, `der` and `pem` supported")]
    UnknownCertFormat,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn picks_a_transport_from_the_endpoint() {
        let timeout = Duration::from_secs(1);

        assert!(matches!(
            Transports::try_new(None, timeout, None, None),
            Ok(Transports::None)
        ));
        assert!(matches!(
            Transports::try_new(Some("https://elevateballers.com".into()), timeout, None, None),
            Ok(Transports::Http(_))
        ));
        assert!(matches!(
            Transports::try_new(Some("/srv/flags.json".into()), timeout, None, None),
            Ok(Transports::File(_))
        ));
        assert!(matches!(
            Transports::try_new(Some("ftp://elevateballers.com".into()), timeout, None, None),
            Err(TransportsError::UnknownUrlScheme)
        ));
    }

    #[test]
    fn bare_paths_are_taken_verbatim() {
        let timeout = Duration::from_secs(1);

        let Ok(Transports::File(relative)) =
            Transports::try_new(Some("snap/flags.json".into()), timeout, None, None)
        else {
            panic!("expected a file transport");
        };
        assert_eq!(relative.path(), std::path::Path::new("snap/flags.json"));

        assert!(matches!(
            Transports::try_new(Some("file://elevateballers.com/flags.json".into()), timeout, None, None),
            Err(TransportsError::FilePath(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_paths_may_contain_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my flags.json");
        std::fs::write(&path, br#"{"home.sponsors": false}"#).unwrap();

        let by_path = Transports::try_new(
            Some(path.to_string_lossy().into_owned()),
            Duration::from_secs(1),
            None,
            None,
        )
        .unwrap();
        assert_eq!(fetch_all(&by_path).await.get("home.sponsors"), Some(&false));

        let by_url = Transports::try_new(
            Some(Url::from_file_path(&path).unwrap().to_string()),
            Duration::from_secs(1),
            None,
            None,
        )
        .unwrap();
        assert_eq!(fetch_all(&by_url).await.get("home.sponsors"), Some(&false));
    }

    #[tokio::test]
    async fn no_transport_fetches_nothing() {
        assert!(fetch_all(&Transports::none()).await.is_empty());
    }

    #[tokio::test]
    async fn failures_become_an_empty_map() {
        let transport = Transports::File(FileTransport::new("/nonexistent/elevate/flags.json"));

        assert!(fetch_all(&transport).await.is_empty());
    }
}
