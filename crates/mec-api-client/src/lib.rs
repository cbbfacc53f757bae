//! # mec-api-client -- Typed Rust client for the MEC admin API
//!
//! Provides typed access to the admin API's record collections, media
//! storage and dashboard summary, and implements
//! [`mec_core::AdminBackend`] on top of them.
//!
//! ## Architecture
//!
//! This crate is the ONLY path by which the console talks HTTP. The console
//! engine (`mec-console`) depends on the `AdminBackend` trait, never on
//! this crate; the binary wires the two together.
//!
//! ## API Path Convention
//!
//! Every path is relative to the configured base URL
//! (`{base_url}/{collection}[/{id}]`), e.g.
//! `https://admin.example.com/api/v1/banners/65f1c0`.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/{collection}` | List records |
//! | GET    | `/{collection}/{id}` | Get one record |
//! | POST   | `/{collection}` | Create record |
//! | PUT    | `/{collection}/{id}` | Update record |
//! | DELETE | `/{collection}/{id}` | Delete record |
//! | POST   | `/{collection}/delete` | Bulk delete `{ids}` |
//! | POST   | `/upload` | Upload media (multipart field `images`) |
//! | POST   | `/upload/delete` | Delete media `{urls}` |
//! | GET    | `/dashboard` | Combined count summary |

pub mod assets;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod envelope;
pub mod error;
pub mod records;

pub use config::AdminApiConfig;
pub use envelope::Envelope;
pub use error::ApiError;

use std::time::Duration;

/// Top-level admin API client.
#[derive(Debug, Clone)]
pub struct AdminApiClient {
    http: reqwest::Client,
    config: AdminApiConfig,
}

impl AdminApiClient {
    /// Create a new admin API client from configuration.
    pub fn new(config: AdminApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    reqwest::header::HeaderValue::from_str(&format!(
                        "Bearer {}",
                        config.api_token.as_str()
                    ))
                    .map_err(|_| ApiError::Config(config::ConfigError::MissingToken))?,
                );
                headers
            })
            .build()
            .map_err(|e| ApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &AdminApiConfig {
        &self.config
    }

    pub(crate) fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// Send a request and unwrap the response envelope.
    ///
    /// Non-2xx statuses become [`ApiError::ApiError`]; a 2xx envelope with
    /// `success: false` becomes [`ApiError::Rejected`].
    pub(crate) async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope, ApiError> {
        tracing::debug!(endpoint, "admin API request");
        let resp = request.send().await.map_err(|e| ApiError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(endpoint, status, "admin API error status");
            return Err(ApiError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let envelope: Envelope = resp.json().await.map_err(|e| ApiError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })?;

        if !envelope.success {
            return Err(ApiError::Rejected {
                endpoint: endpoint.into(),
                message: envelope.message,
            });
        }
        Ok(envelope)
    }
}
