//! Authenticated calls against provider REST endpoints.
//!
//! [`ProfileClient`] performs the single bearer-authenticated GET that plain
//! OAuth2 drivers need to obtain their claim set, plus the GitHub email list
//! request used to backfill a private address.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::claims::RawClaims;
use crate::error::{Error, Result};

/// One entry of the GitHub `/user/emails` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub primary: bool,

    #[serde(default)]
    pub verified: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

impl EmailRecord {
    pub fn new(email: impl Into<String>, primary: bool, verified: bool) -> Self {
        Self {
            email: email.into(),
            primary,
            verified,
            visibility: None,
        }
    }
}

/// The first record that is both primary and verified.
pub fn primary_verified(records: &[EmailRecord]) -> Option<&EmailRecord> {
    records.iter().find(|r| r.primary && r.verified)
}

/// Thin wrapper over a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ProfileClient {
    http_client: reqwest::Client,
}

impl ProfileClient {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Fetch the profile document at `url`.
    ///
    /// # Errors
    ///
    /// - [`Error::ProfileFetchFailed`] when the request cannot be sent
    /// - [`Error::ProfileBadStatus`] for any non-2xx answer
    /// - [`Error::ProfileDecodeFailed`] when the body is not a JSON object
    pub async fn profile(&self, url: &str, access_token: &str) -> Result<RawClaims> {
        tracing::debug!(url = %url, "Fetching profile");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(Error::ProfileFetchFailed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ProfileBadStatus {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::ProfileDecodeFailed(e.to_string()))?;

        RawClaims::try_from(body)
            .map_err(|kind| Error::ProfileDecodeFailed(format!("expected object, got {}", kind)))
    }

    /// Fetch the email list at `url`.
    ///
    /// Non-2xx answers count as fetch failures here, unlike the profile call.
    pub async fn emails(&self, url: &str, access_token: &str) -> Result<Vec<EmailRecord>> {
        tracing::debug!(url = %url, "Fetching emails");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(Error::EmailFetchFailed)?;

        response
            .json()
            .await
            .map_err(|e| Error::EmailDecodeFailed(e.to_string()))
    }
}
