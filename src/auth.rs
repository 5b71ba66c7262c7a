//! Credential loading for the presentation API
//!
//! Credentials are read once at server start and shared by every export run.
//! Tokens must carry read access to presentations and to drive content
//! (thumbnail URLs point at drive storage). Service-account tokens are minted
//! for [`SCOPES`] and refreshed by `gcp_auth` before they expire.

use crate::error::{Error, Result};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Scopes the supplied credentials are expected to carry
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/presentations.readonly",
];

/// How requests to the presentation API are authorized
#[derive(Clone)]
pub enum Credentials {
    /// Service-account key file; access tokens are requested for [`SCOPES`]
    ServiceAccount(Arc<CustomServiceAccount>),
    /// OAuth access token, sent as a bearer token
    AccessToken(String),
    /// API key, sent as the `key` query parameter
    ApiKey(String),
}

#[derive(Deserialize)]
struct CredentialsFile {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
}

impl Credentials {
    /// Load credentials from a service-account key file, or a JSON file
    /// containing `access_token` or `api_key`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::CredentialsNotFound {
                path: path.display().to_string(),
            });
        }

        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parse credentials from the JSON body of a credentials file
    pub fn from_json(data: &str) -> Result<Self> {
        let file: CredentialsFile =
            serde_json::from_str(data).map_err(|e| Error::InvalidCredentials {
                reason: format!("Malformed credentials file: {}", e),
            })?;

        if file.kind.as_deref() == Some("service_account") {
            let account =
                CustomServiceAccount::from_json(data).map_err(|e| Error::InvalidCredentials {
                    reason: format!("Invalid service account key: {}", e),
                })?;
            return Ok(Credentials::ServiceAccount(Arc::new(account)));
        }

        match (non_blank(file.access_token), non_blank(file.api_key)) {
            (Some(token), _) => Ok(Credentials::AccessToken(token)),
            (None, Some(key)) => Ok(Credentials::ApiKey(key)),
            (None, None) => Err(Error::InvalidCredentials {
                reason: "expected a service account key, \"access_token\" or \"api_key\""
                    .to_string(),
            }),
        }
    }

    /// Attach these credentials to an outgoing request.
    /// Service accounts fetch a cached or freshly minted token first.
    pub async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        match self {
            Credentials::ServiceAccount(account) => {
                let token = account
                    .token(&SCOPES)
                    .await
                    .map_err(|e| Error::Authorization {
                        reason: e.to_string(),
                    })?;
                Ok(request.bearer_auth(token.as_str()))
            }
            Credentials::AccessToken(token) => Ok(request.bearer_auth(token)),
            Credentials::ApiKey(key) => Ok(request.query(&[("key", key)])),
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ServiceAccount(_) => f.write_str("Credentials::ServiceAccount(..)"),
            Credentials::AccessToken(_) => f.write_str("Credentials::AccessToken(..)"),
            Credentials::ApiKey(_) => f.write_str("Credentials::ApiKey(..)"),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
