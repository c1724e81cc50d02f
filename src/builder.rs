use std::time::Duration;

use reqwest::Certificate;
use url::Url;

use crate::transport::{Transport, Transports, TransportsError};
use crate::{FlagClient, Worker};

pub(crate) const ENDPOINT_VAR: &str = "ELEVATE_FLAGS_ENDPOINT";

#[derive(Default)]
pub struct Builder {
    endpoint: Option<String>,
    proxy: Option<Url>,
    certificate: Option<Certificate>,
    timeout: Option<Duration>,
    prefetch: bool,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            endpoint: None,
            proxy: None,
            certificate: None,
            timeout: None,
            prefetch: false,
        }
    }

    /// A builder pointed at `ELEVATE_FLAGS_ENDPOINT`, if it is set.
    pub fn from_env() -> Self {
        Self::new().set_endpoint(std::env::var(ENDPOINT_VAR).ok())
    }

    /// Site root (`https://elevateballers.com`) or a path to a JSON snapshot.
    /// Without an endpoint nothing is fetched and every flag reads as enabled:
    ///
    /// ```rust
    /// use elevate_flags::Builder;
    ///
    /// # tokio_test::block_on(async {
    /// let (flags, _worker) = Builder::new()
    ///   .set_endpoint(None)
    ///   .build()
    ///   .unwrap();
    ///
    /// assert!(flags.is_enabled("home.postSlider").await);
    /// # })
    /// ```
    pub fn set_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn set_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout = duration;
        self
    }

    /// Start fetching as soon as the worker is up instead of on first use.
    pub fn set_prefetch(mut self, prefetch: bool) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Set the certificate from a path.
    ///
    /// Certificate paths that are invalid or can't be parsed are ignored with a tracing warning.
    ///
    /// If you would like more strict checking of the certificates, use `set_certificate` directly.
    pub async fn set_certificate_from_path(
        self,
        certificate_path: Option<std::path::PathBuf>,
    ) -> Self {
        let Some(path) = certificate_path else {
            return self;
        };

        let Ok(certs) = read_cert_file(&path).await.inspect_err(|e| {
            tracing::warn!(?path, %e, "Failed to parse the TLS certificates");
        }) else {
            return self;
        };

        self.set_certificate(Some(certs))
    }

    pub fn set_certificate(mut self, certificate: Option<Certificate>) -> Self {
        self.certificate = certificate;
        self
    }

    pub fn set_proxy(mut self, proxy: Option<Url>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Must be called inside a Tokio runtime.
    #[tracing::instrument(skip(self))]
    pub fn build(mut self) -> Result<(FlagClient, Worker), TransportsError> {
        let transport = Transports::try_new(
            self.endpoint.take(),
            self.timeout
                .take()
                .unwrap_or_else(|| Duration::from_secs(3)),
            self.certificate.take(),
            self.proxy.take(),
        )?;

        Ok(self.build_with(transport))
    }

    pub fn build_with<T: Transport>(self, transport: T) -> (FlagClient, Worker) {
        Worker::new(transport, self.prefetch)
    }
}

#[tracing::instrument(ret(level = tracing::Level::TRACE))]
async fn read_cert_file(
    ssl_cert_file: impl AsRef<std::path::Path> + std::fmt::Debug,
) -> Result<Certificate, TransportsError> {
    let cert_buf = tokio::fs::read(&ssl_cert_file)
        .await
        .map_err(|e| TransportsError::Read(ssl_cert_file.as_ref().to_path_buf(), e))?;

    if let Ok(cert) = Certificate::from_pem(cert_buf.as_slice()) {
        return Ok(cert);
    }

    if let Ok(cert) = Certificate::from_der(cert_buf.as_slice()) {
        return Ok(cert);
    }

    Err(TransportsError::UnknownCertFormat)
}

#[cfg(test)]
mod test {
    #[tokio::test]
    async fn unreadable_certificates_are_ignored() {
        let builder = super::Builder::new()
            .set_certificate_from_path(Some("/nonexistent/elevate/ca.pem".into()))
            .await;

        assert!(builder.certificate.is_none());
    }

    #[tokio::test]
    async fn builds_without_an_endpoint() {
        let (client, worker) = super::Builder::new().build().unwrap();
        let worker = tokio::spawn(worker.wait());

        assert!(client.is_enabled("home.postSlider").await);
        assert!(client.is_loaded());

        drop(client);
        worker.await.unwrap();
    }
}
