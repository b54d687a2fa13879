// Shared plumbing for the outbound HTTP clients
//
// Every upstream (indexer, node RPC, rank API, GeoIP) goes through a reqwest
// client built here with the configured timeout, and reports its outcome and
// latency to the metrics registry.

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::metrics::{observe_upstream, Timer};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{service}: resource not found")]
    NotFound { service: &'static str },
    #[error("{service} response could not be decoded: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
    #[error("{service} base URL is unusable: {message}")]
    InvalidUrl {
        service: &'static str,
        message: String,
    },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl UpstreamError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::NotFound { .. })
    }

    pub(crate) fn decode(service: &'static str, message: impl ToString) -> Self {
        UpstreamError::Decode {
            service,
            message: message.to_string(),
        }
    }
}

/// Build the HTTP client shared by all upstreams
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!("lotusia-explorer/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send a request and read the whole body, whatever its status
pub(crate) async fn send_raw(
    service: &'static str,
    request: RequestBuilder,
) -> Result<(StatusCode, Vec<u8>), UpstreamError> {
    let timer = Timer::new();
    let result = async {
        let response = request
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { service, source })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Transport { service, source })?;
        Ok((status, body.to_vec()))
    }
    .await;
    observe_upstream(service, result.is_ok(), &timer);
    result
}

/// GET-style request whose body is a JSON document of type `T`
pub(crate) async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T, UpstreamError> {
    let (status, body) = send_raw(service, request).await?;
    check_status(service, status)?;
    serde_json::from_slice(&body).map_err(|e| UpstreamError::decode(service, e))
}

/// Map 404 to `NotFound` and any other non-2xx status to `Status`
pub(crate) fn check_status(service: &'static str, status: StatusCode) -> Result<(), UpstreamError> {
    if status == StatusCode::NOT_FOUND {
        return Err(UpstreamError::NotFound { service });
    }
    if !status.is_success() {
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
        });
    }
    Ok(())
}

/// Append path segments to a base URL, percent-encoding each segment
pub(crate) fn join_url(
    service: &'static str,
    base: &str,
    segments: &[&str],
) -> Result<Url, UpstreamError> {
    let invalid = |message: String| UpstreamError::InvalidUrl { service, message };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid(format!("{} cannot carry a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
