//! JSON-over-HTTPS client shared by the REST services.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use diabeto_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use diabeto_core::types::ServiceUrl;
use diabeto_core::Result;

/// Convert a reqwest failure into a transport error.
pub(crate) fn map_reqwest(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout {
            message: err.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// Error envelope used by the hosted APIs.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base: ServiceUrl,
}

impl RestClient {
    /// Create a client for the service at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(base: ServiceUrl) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("diabeto/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_reqwest)?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &ServiceUrl {
        &self.base
    }

    /// Absolute URL for `path` below the base.
    pub fn url(&self, path: &str) -> String {
        self.base.join(path)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path)).query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        request
    }

    /// POST a JSON body and decode a JSON response.
    #[instrument(skip(self, body, query, bearer), fields(base = %self.base))]
    pub async fn post_json<B, R>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
        bearer: Option<&str>,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(path, "POST");
        let response = self
            .request(Method::POST, path, query, bearer)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;
        self.handle_response(response).await
    }

    /// POST raw bytes and decode a JSON response.
    #[instrument(skip(self, bytes, query, bearer), fields(base = %self.base, len = bytes.len()))]
    pub async fn post_bytes<R>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        bytes: Vec<u8>,
        content_type: &str,
        bearer: Option<&str>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!(path, content_type, "POST bytes");
        let response = self
            .request(Method::POST, path, query, bearer)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(map_reqwest)?;
        self.handle_response(response).await
    }

    /// POST a JSON body and return the response text whatever the status.
    ///
    /// Only transport failures are errors.
    #[instrument(skip(self, body, bearer), fields(base = %self.base))]
    pub async fn post_json_text<B>(&self, path: &str, body: &B, bearer: Option<&str>) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        debug!(path, "POST");
        let response = self
            .request(Method::POST, path, &[], bearer)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;
        trace!(status = %response.status(), "response");
        response.text().await.map_err(map_reqwest)
    }

    /// GET and decode a JSON response.
    #[instrument(skip(self, query, bearer), fields(base = %self.base))]
    pub async fn get_json<R>(&self, path: &str, query: &[(&str, &str)], bearer: Option<&str>) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!(path, "GET");
        let response = self
            .request(Method::GET, path, query, bearer)
            .send()
            .await
            .map_err(map_reqwest)?;
        self.handle_response(response).await
    }

    /// DELETE, discarding any response body.
    #[instrument(skip(self, query, bearer), fields(base = %self.base))]
    pub async fn delete(&self, path: &str, query: &[(&str, &str)], bearer: Option<&str>) -> Result<()> {
        debug!(path, "DELETE");
        let response = self
            .request(Method::DELETE, path, query, bearer)
            .send()
            .await
            .map_err(map_reqwest)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Protocol(self.parse_error_response(response).await))
        }
    }

    async fn handle_response<R: DeserializeOwned>(&self, response: Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "response");

        if status.is_success() {
            let text = response.text().await.map_err(map_reqwest)?;
            serde_json::from_str(&text).map_err(|e| {
                Error::Protocol(ProtocolError::new(
                    status.as_u16(),
                    Some("InvalidResponse".to_string()),
                    Some(e.to_string()),
                ))
            })
        } else {
            Err(Error::Protocol(self.parse_error_response(response).await))
        }
    }

    async fn parse_error_response(&self, response: Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.error.status, body.error.message),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}

/// Reject a blank configuration value.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(InvalidInputError::Field {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        }));
    }
    Ok(())
}
