//! Transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port using the reqwest
//! library. It handles all HTTP communication for the harness; the
//! engine itself never touches the network.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};

use pactum_application::ports::{
    Transport, TransportFailure, TransportRequest, TransportResponse,
};
use pactum_domain::{HttpMethod, TransportErrorKind};

/// Transport adapter backed by `reqwest::Client`.
///
/// Per-attempt timeouts are enforced by the executor, so the inner
/// client carries no request timeout of its own.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "Pactum/0.1.0"
    ///
    /// # Errors
    ///
    /// Returns a failure if the underlying client cannot be built.
    pub fn new() -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .user_agent("Pactum/0.1.0")
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportFailure::new(TransportErrorKind::Other, e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a transport over a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Classifies reqwest errors into transport failure kinds.
    fn map_error(error: &reqwest::Error) -> TransportFailure {
        let message = error.to_string();

        if error.is_timeout() {
            return TransportFailure::new(TransportErrorKind::Timeout, message);
        }

        if error.is_connect() {
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return TransportFailure::new(TransportErrorKind::DnsFailure, message);
            }
            if lowered.contains("refused") {
                return TransportFailure::new(TransportErrorKind::ConnectionRefused, message);
            }
            return TransportFailure::new(TransportErrorKind::ConnectionFailed, message);
        }

        TransportFailure::new(TransportErrorKind::Other, message)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        let url = Url::parse(&request.url).map_err(|e| {
            TransportFailure::new(TransportErrorKind::Other, format!("{e}: {}", request.url))
        })?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| Self::map_error(&e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e))?
            .to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_method_mapping() {
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
    }
}
