use reqwest::Certificate;
use url::Url;

use crate::FlagMap;

use super::Transport;

const FEATURE_FLAGS_PATH: &str = "/api/feature-flags";

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    host: Url,
    timeout: std::time::Duration,
    client: reqwest::Client,
}
impl ReqwestTransport {
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(err))]
    pub(crate) fn new(
        host: Url,
        timeout: std::time::Duration,
        certificates: Option<Certificate>,
        proxy: Option<Url>,
    ) -> Result<Self, ReqwestTransportError> {
        let mut builder = reqwest::ClientBuilder::new();

        if let Some(cert) = certificates {
            builder = builder.add_root_certificate(cert);
        }

        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.clone())?);
        }

        Ok(ReqwestTransport {
            host,
            client: builder.build()?,
            timeout,
        })
    }
}

impl Transport for ReqwestTransport {
    type Error = ReqwestTransportError;

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip_all, ret(level = tracing::Level::TRACE)))]
    async fn fetch_flags(&self) -> Result<FlagMap, Self::Error> {
        let mut url = self.host.clone();
        url.set_path(FEATURE_FLAGS_PATH);

        let resp = self
            .client
            .get(url.clone())
            .header(::http::header::ACCEPT, super::APPLICATION_JSON)
            .timeout(self.timeout)
            .send()
            .await
            .inspect_err(|_| tracing::debug!("Failed to reach `{url}`"))?;

        if !resp.status().is_success() {
            return Err(ReqwestTransportError::Status(resp.status()));
        }

        Ok(resp.json().await?)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ReqwestTransportError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("The flag endpoint answered with {0}")]
    Status(reqwest::StatusCode),
}
