//! statusgrid-http: HTTP implementation of the status transport.
//!
//! Talks to per-source status endpoints over HTTP/1.1:
//! `GET {endpoint}/v1/status/{namespace}/{name}` under a per-request
//! deadline, decoding a JSON payload into a `StatusRecord`. Each call
//! opens a fresh connection, sends one request, and reads one body;
//! retry and fan-out live above this crate.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use tokio::net::TcpStream;
use tracing::debug;

use statusgrid_core::config::endpoint_authority;
use statusgrid_core::{
    CancelToken, Config, ConfigError, DeploymentPhase, StatusRecord, StatusTransport, TargetQuery,
    TransportError, epoch_secs,
};

/// JSON body a status endpoint answers with.
#[derive(Debug, Deserialize)]
struct StatusPayload {
    desired_replicas: u32,
    ready_replicas: u32,
    /// Phase string; absent or unrecognized values decode as unknown.
    #[serde(default)]
    phase: Option<String>,
    /// Unix timestamp of the snapshot; absent means "now".
    #[serde(default)]
    observed_at: Option<u64>,
}

/// HTTP/1.1 status transport.
///
/// Holds the source-to-endpoint map and the per-request deadline.
/// Identity fields on returned records always come from the query,
/// never from the response body, so results match back to inputs.
pub struct HttpStatusTransport {
    endpoints: HashMap<String, String>,
    request_timeout: Duration,
}

impl HttpStatusTransport {
    pub fn new(endpoints: HashMap<String, String>, request_timeout: Duration) -> Self {
        Self {
            endpoints,
            request_timeout,
        }
    }

    /// Build a transport from the `[[sources]]` and `[transport]`
    /// sections of a config.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.source_endpoints(), config.request_timeout()?))
    }

    fn endpoint_for(&self, target: &TargetQuery) -> Result<&str, TransportError> {
        self.endpoints
            .get(&target.source)
            .map(String::as_str)
            .ok_or_else(|| {
                TransportError::NotFound(format!("no endpoint for source {:?}", target.source))
            })
    }

    async fn call(&self, target: &TargetQuery) -> Result<StatusRecord, TransportError> {
        let base = self.endpoint_for(target)?;
        let authority = authority_of(base)?;
        let uri = format!(
            "http://{authority}/v1/status/{}/{}",
            target.namespace, target.name
        );

        let outcome = tokio::time::timeout(
            self.request_timeout,
            self.send_request(&authority, &uri, target),
        )
        .await;

        match outcome {
            Ok(result) => result,
            Err(_) => {
                debug!(%uri, timeout = ?self.request_timeout, "status call timed out");
                Err(TransportError::Timeout(self.request_timeout))
            }
        }
    }

    async fn send_request(
        &self,
        authority: &str,
        uri: &str,
        target: &TargetQuery,
    ) -> Result<StatusRecord, TransportError> {
        let stream = TcpStream::connect(authority)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = http1::handshake(io)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("GET")
            .uri(uri)
            .header("host", authority)
            .header("accept", "application/json")
            .header("user-agent", concat!("statusgrid/", env!("CARGO_PKG_VERSION")))
            .body(Empty::<Bytes>::new())
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let response = sender
            .send_request(req)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%uri, status = %status, "status endpoint answered non-2xx");
            return Err(match status.as_u16() {
                404 => TransportError::NotFound(target.key()),
                429 => TransportError::Unavailable { status: 429 },
                code if status.is_server_error() => TransportError::Unavailable { status: code },
                code => TransportError::Rejected { status: code },
            });
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?
            .to_bytes();
        let payload: StatusPayload = serde_json::from_slice(&body).map_err(|e| {
            debug!(%uri, error = %e, "undecodable status payload");
            TransportError::Malformed(e.to_string())
        })?;

        Ok(StatusRecord {
            name: target.name.clone(),
            namespace: target.namespace.clone(),
            source: target.source.clone(),
            desired_replicas: payload.desired_replicas,
            ready_replicas: payload.ready_replicas,
            phase: payload
                .phase
                .as_deref()
                .map(DeploymentPhase::from_wire)
                .unwrap_or(DeploymentPhase::Unknown),
            observed_at: payload.observed_at.unwrap_or_else(epoch_secs),
        })
    }
}

#[async_trait]
impl StatusTransport for HttpStatusTransport {
    async fn get_status(
        &self,
        target: &TargetQuery,
        cancel: &CancelToken,
    ) -> Result<StatusRecord, TransportError> {
        tokio::select! {
            result = self.call(target) => result,
            _ = cancel.cancelled() => {
                Err(TransportError::Connect("call abandoned by cancel".into()))
            }
        }
    }
}

/// Extract `host:port` from an `http://` base endpoint.
///
/// Uses the same parser config validation runs, so an endpoint that
/// got past `validate()` cannot fail here.
fn authority_of(endpoint: &str) -> Result<String, TransportError> {
    endpoint_authority(endpoint)
        .map(str::to_string)
        .ok_or_else(|| {
            TransportError::NotFound(format!(
                "endpoint {endpoint:?} is not a plain http://host:port URL"
            ))
        })
}
