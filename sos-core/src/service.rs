use std::{fmt::Debug, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info};

use crate::error::SosError;

pub const SOS_VERSION: &str = "2.0.0";

/// One GetObservation request, as sent over the wire (KVP binding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetObservationRequest {
    pub response_format: String,
    pub offering: String,
    pub observed_property: String,
    /// Temporal filter, e.g. `om:phenomenonTime,2024-05-01T00:00:00/2024-05-03T00:00:00`.
    pub event_time: String,
    /// Namespace declaration for the prefix used in `event_time`.
    pub namespaces: String,
    pub timeout: Option<Duration>,
}

impl GetObservationRequest {
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("service", "SOS"),
            ("version", SOS_VERSION),
            ("request", "GetObservation"),
            ("offering", self.offering.as_str()),
            ("observedProperty", self.observed_property.as_str()),
            ("responseFormat", self.response_format.as_str()),
            ("temporalFilter", self.event_time.as_str()),
            ("namespaces", self.namespaces.as_str()),
        ]
    }
}

/// The remote SOS server, reduced to the two calls this client makes.
///
/// Implementations return the raw response body; decoding is done by the
/// caller so it can attach the body to decoding errors.
#[async_trait]
pub trait ObservationService: Send + Sync + Debug {
    async fn get_capabilities(&self) -> Result<String, SosError>;

    async fn get_observation(&self, request: &GetObservationRequest) -> Result<String, SosError>;
}

#[derive(Debug, Clone)]
pub struct HttpSosClient {
    base_url: Url,
    http: Client,
}

impl HttpSosClient {
    pub fn new(base_url: Url) -> Self {
        Self { base_url, http: Client::new() }
    }

    /// Full GetCapabilities URL for this server.
    pub fn capabilities_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("REQUEST", "GetCapabilities")
            .append_pair("SERVICE", "SOS")
            .append_pair("ACCEPTVERSIONS", SOS_VERSION);
        url
    }

    pub fn observation_url(&self, request: &GetObservationRequest) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in request.query_pairs() {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

#[async_trait]
impl ObservationService for HttpSosClient {
    async fn get_capabilities(&self) -> Result<String, SosError> {
        let url = self.capabilities_url();
        debug!(%url, "sending GetCapabilities");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error(err, None, capabilities_failure))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|err| transport_error(err, None, capabilities_failure))?;

        if !status.is_success() {
            return Err(SosError::capabilities(status_message(status), &body));
        }

        info!(bytes = body.len(), "received capabilities");
        Ok(body)
    }

    async fn get_observation(&self, request: &GetObservationRequest) -> Result<String, SosError> {
        let url = self.observation_url(request);
        debug!(%url, timeout = ?request.timeout, "sending GetObservation");

        let mut builder = self.http.get(url);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let res = builder
            .send()
            .await
            .map_err(|err| transport_error(err, request.timeout, query_failure))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|err| transport_error(err, request.timeout, query_failure))?;

        if !status.is_success() {
            return Err(SosError::query(status_message(status), &body));
        }

        info!(bytes = body.len(), offering = %request.offering, "received observations");
        Ok(body)
    }
}

fn transport_error(
    err: reqwest::Error,
    timeout: Option<Duration>,
    wrap: fn(String) -> SosError,
) -> SosError {
    if err.is_timeout() {
        return SosError::Timeout { timeout };
    }
    wrap(format!("transport error: {err}"))
}

fn capabilities_failure(message: String) -> SosError {
    SosError::capabilities(message, "")
}

fn query_failure(message: String) -> SosError {
    SosError::query(message, "")
}

fn status_message(status: StatusCode) -> String {
    format!("server answered with status {status}")
}

/// Construct a service handle for the SOS server at `url`.
pub fn service_from_url(url: &str) -> anyhow::Result<Box<dyn ObservationService>> {
    let parsed = Url::parse(url.trim()).with_context(|| format!("Invalid SOS service URL '{url}'"))?;

    match parsed.scheme() {
        "http" | "https" => Ok(Box::new(HttpSosClient::new(parsed))),
        other => Err(anyhow::anyhow!(
            "Unsupported URL scheme '{other}' in '{url}'. Only http and https are supported."
        )),
    }
}
