//! The outbound call seam. [`HttpTransport`] talks to a real service; tests script their own.

use drift_core::Error;
use std::collections::BTreeMap;
use std::future::Future;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    /// Serialized JSON body.
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A failure below the HTTP status line: DNS, connect, TLS, a reset connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Network {
            message: err.message,
        }
    }
}

/// Issues one request and resolves with the raw response.
///
/// Dropping the returned future must abandon the call; the driver relies on that to cancel on
/// deadline or abort.
pub trait Transport {
    fn send(
        &self,
        request: &TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("drift/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: &TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        let prepared = reqwest::Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| TransportError::new(format!("invalid HTTP method `{}`", request.method)))
            .map(|method| {
                let mut builder = self
                    .client
                    .request(method, request.url.as_str())
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .header(reqwest::header::ACCEPT, "application/json")
                    .body(request.body.clone());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder
            });

        async move {
            let response = prepared?.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            tracing::trace!(status, bytes = body.len(), "layout service responded");
            Ok(TransportResponse { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let ok = TransportResponse {
            status: 204,
            body: Vec::new(),
        };
        let bad = TransportResponse {
            status: 502,
            body: b"bad gateway".to_vec(),
        };
        assert!(ok.is_success());
        assert!(!bad.is_success());
        assert_eq!(bad.body_text(), "bad gateway");
    }

    #[test]
    fn network_failures_map_to_transport_kind() {
        let err: Error = TransportError::new("connection refused").into();
        assert_eq!(err.kind(), drift_core::ErrorKind::Transport);
    }
}
