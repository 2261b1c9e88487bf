//! Client configuration.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `TECNOQUALITY_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::http::Service;

/// Where the session record is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory (lost when the process exits).
    Memory,
    /// One JSON file per key under `dir`.
    File { dir: PathBuf },
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the identity (users) service.
    pub identity_url: String,
    /// Base URL of the forms service.
    pub forms_url: String,
    /// Base URL of the drivers/clients service.
    pub drivers_url: String,
    /// Base URL of the documents service.
    pub documents_url: String,
    pub storage: StorageBackend,
    /// Per-request timeout shared by every client. `None` waits forever.
    pub request_timeout: Option<Duration>,
    /// Log filter used when `RUST_LOG` is unset (e.g. `info`, `debug`).
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            identity_url: "http://localhost:8080".to_owned(),
            forms_url: "http://localhost:8081".to_owned(),
            drivers_url: "http://localhost:8082".to_owned(),
            documents_url: "http://localhost:8083".to_owned(),
            storage: StorageBackend::File {
                dir: default_storage_dir(),
            },
            request_timeout: None,
            log_level: "info".to_owned(),
        }
    }
}

impl ClientConfig {
    /// Configuration with every service at `base_url` and in-memory storage.
    pub fn single_host(base_url: impl Into<String>) -> Self {
        let base_url = trim_url(base_url.into());
        Self {
            identity_url: base_url.clone(),
            forms_url: base_url.clone(),
            drivers_url: base_url.clone(),
            documents_url: base_url,
            storage: StorageBackend::Memory,
            ..Self::default()
        }
    }

    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `TECNOQUALITY_IDENTITY_URL` (default: `http://localhost:8080`)
    /// - `TECNOQUALITY_FORMS_URL` (default: `http://localhost:8081`)
    /// - `TECNOQUALITY_DRIVERS_URL` (default: `http://localhost:8082`)
    /// - `TECNOQUALITY_DOCUMENTS_URL` (default: `http://localhost:8083`)
    /// - `TECNOQUALITY_STORAGE`: `memory` or `file` (default: `file`)
    /// - `TECNOQUALITY_STORAGE_PATH`: directory for `file` storage
    /// - `TECNOQUALITY_REQUEST_TIMEOUT_MS`: optional request timeout
    /// - `TECNOQUALITY_LOG_LEVEL`: log filter (default: `info`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let url = |key: &str, default: String| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(trim_url)
                .unwrap_or(default)
        };

        let storage = match lookup("TECNOQUALITY_STORAGE")
            .unwrap_or_else(|| "file".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            _ => StorageBackend::File {
                dir: lookup("TECNOQUALITY_STORAGE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_storage_dir),
            },
        };

        let request_timeout = lookup("TECNOQUALITY_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        Self {
            identity_url: url("TECNOQUALITY_IDENTITY_URL", defaults.identity_url),
            forms_url: url("TECNOQUALITY_FORMS_URL", defaults.forms_url),
            drivers_url: url("TECNOQUALITY_DRIVERS_URL", defaults.drivers_url),
            documents_url: url("TECNOQUALITY_DOCUMENTS_URL", defaults.documents_url),
            storage,
            request_timeout,
            log_level: lookup("TECNOQUALITY_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    pub fn service_url(&self, service: Service) -> &str {
        match service {
            Service::Identity => &self.identity_url,
            Service::Forms => &self.forms_url,
            Service::Drivers => &self.drivers_url,
            Service::Documents => &self.documents_url,
        }
    }
}

/// Platform data directory for the persisted session record.
pub fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("tecnoquality"))
        .unwrap_or_else(|| PathBuf::from(".tecnoquality"))
}

fn trim_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_owned()
}
