//! HTTP clients for the backend services.
//!
//! One [`ServiceClient`] per backend, all built from the same configuration
//! and sharing:
//! - one cookie jar (the session cookie issued by the identity service goes
//!   with every request),
//! - one [`ResponsePolicy`] (HTML guard + 401 handling),
//!
//! so the four clients cannot drift apart. Only the base address differs.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::invalidation::SessionInvalidator;

/// Backend services the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Users: login, logout, token verification.
    Identity,
    Forms,
    /// Drivers and their companies.
    Drivers,
    Documents,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Identity,
        Service::Forms,
        Service::Drivers,
        Service::Documents,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Service::Identity => "identity",
            Service::Forms => "forms",
            Service::Drivers => "drivers",
            Service::Documents => "documents",
        }
    }
}

impl core::fmt::Display for Service {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{service} service rejected the session (401)")]
    Unauthorized { service: Service },

    #[error("{service} service returned an HTML page instead of data")]
    HtmlResponse { service: Service },

    #[error("{service} service error ({status}): {body}")]
    Api {
        service: Service,
        status: u16,
        body: String,
    },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(reqwest::Error),

    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl HttpError {
    fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A successful (2xx, non-HTML) response, body already read.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    status: StatusCode,
    body: String,
}

impl ServiceResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

const HTML_MARKER: &str = "<!doctype html";

/// Whether `body` is an HTML document posing as a payload.
///
/// Only string payloads count: a body that parses as a JSON object, array,
/// number or boolean is data even if some field happens to contain markup.
pub fn is_html_document(body: &str) -> bool {
    let contains_marker = |s: &str| s.to_ascii_lowercase().contains(HTML_MARKER);
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(s)) => contains_marker(&s),
        Ok(_) => false,
        Err(_) => contains_marker(body),
    }
}

/// The response policy every client applies.
#[derive(Debug)]
pub struct ResponsePolicy {
    invalidator: SessionInvalidator,
}

impl ResponsePolicy {
    pub fn new(invalidator: SessionInvalidator) -> Self {
        Self { invalidator }
    }

    /// Check a raw response.
    ///
    /// - 401 → forced logout, `Unauthorized`
    /// - other non-2xx → `Api`
    /// - HTML body → `HtmlResponse`
    pub async fn apply(
        &self,
        service: Service,
        response: reqwest::Response,
    ) -> Result<ServiceResponse, HttpError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.invalidator.invalidate(service);
            return Err(HttpError::Unauthorized { service });
        }

        let body = response.text().await.map_err(HttpError::transport)?;

        if !status.is_success() {
            return Err(HttpError::Api {
                service,
                status: status.as_u16(),
                body,
            });
        }

        if is_html_document(&body) {
            tracing::warn!(%service, "received an HTML document instead of data");
            return Err(HttpError::HtmlResponse { service });
        }

        Ok(ServiceResponse { status, body })
    }
}

/// Client bound to one backend service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    service: Service,
    base_url: String,
    http: reqwest::Client,
    policy: Arc<ResponsePolicy>,
}

impl ServiceClient {
    pub fn service(&self) -> Service {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request against this service. Send it with [`ServiceClient::send`]
    /// so the shared policy applies.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<ServiceResponse, HttpError> {
        let response = request.send().await.map_err(|err| {
            tracing::debug!(service = %self.service, "request failed: {err}");
            HttpError::transport(err)
        })?;
        self.policy.apply(self.service, response).await
    }

    pub async fn get(&self, path: &str) -> Result<ServiceResponse, HttpError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ServiceResponse, HttpError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// POST without a body.
    pub async fn post_empty(&self, path: &str) -> Result<ServiceResponse, HttpError> {
        self.send(self.request(Method::POST, path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ServiceResponse, HttpError> {
        self.send(self.request(Method::DELETE, path)).await
    }
}

/// The four backend clients.
#[derive(Debug, Clone)]
pub struct HttpClientSet {
    identity: ServiceClient,
    forms: ServiceClient,
    drivers: ServiceClient,
    documents: ServiceClient,
}

impl HttpClientSet {
    pub fn new(config: &ClientConfig, invalidator: SessionInvalidator) -> Result<Self, HttpError> {
        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder()
            .cookie_provider(jar)
            .user_agent(concat!("tecnoquality-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(HttpError::Network)?;
        let policy = Arc::new(ResponsePolicy::new(invalidator));

        let client = |service: Service| ServiceClient {
            service,
            base_url: config.service_url(service).trim_end_matches('/').to_owned(),
            http: http.clone(),
            policy: policy.clone(),
        };

        Ok(Self {
            identity: client(Service::Identity),
            forms: client(Service::Forms),
            drivers: client(Service::Drivers),
            documents: client(Service::Documents),
        })
    }

    pub fn get(&self, service: Service) -> &ServiceClient {
        match service {
            Service::Identity => &self.identity,
            Service::Forms => &self.forms,
            Service::Drivers => &self.drivers,
            Service::Documents => &self.documents,
        }
    }

    pub fn identity(&self) -> &ServiceClient {
        &self.identity
    }

    pub fn forms(&self) -> &ServiceClient {
        &self.forms
    }

    pub fn drivers(&self) -> &ServiceClient {
        &self.drivers
    }

    pub fn documents(&self) -> &ServiceClient {
        &self.documents
    }
}
