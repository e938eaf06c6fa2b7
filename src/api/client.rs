//! Client for the chime notification service.

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::PairingError;
use crate::pairing::{Credential, RegistrationResult};

/// Wire-protocol adapter for the four remote operations.
///
/// Every payload arrives inside a `{ "data": ... }` envelope. Register,
/// confirm and notify are strict calls that fail the current attempt on
/// any transport or server error; the pending check is deliberately
/// tolerant and reads every failure as "not subscribed yet", so a flaky
/// network only costs polling ticks.
pub struct ApiClient {
    client: reqwest::Client,
    api_base_url: String,
    web_base_url: String,
}

/// Response envelope wrapping every API payload.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Payload of `POST /tokens`.
#[derive(Debug, Deserialize)]
struct RegisterData {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    sub_id: Option<String>,
    #[serde(default)]
    nonce: Option<String>,
}

/// Payload of `GET /subscriptions/pending`.
#[derive(Debug, Deserialize)]
struct PendingData {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    valid: bool,
}

/// Payload of `POST /subscriptions/{sub_id}/confirmations`.
#[derive(Debug, Deserialize)]
struct ConfirmationData {
    #[serde(default)]
    success: bool,
}

impl ApiClient {
    /// Create a client for the configured origins.
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            web_base_url: config.web_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Register for a fresh token, sub_id and nonce.
    ///
    /// The three fields are required together; a 2xx response missing any
    /// of them is an incomplete registration, distinct from a transport
    /// failure.
    pub async fn register(&self) -> Result<RegistrationResult, PairingError> {
        let url = format!("{}/tokens", self.api_base_url);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| PairingError::RegistrationFailed { source })?;

        let envelope: Envelope<RegisterData> = response
            .json()
            .await
            .map_err(|_| PairingError::IncompleteRegistration)?;

        let RegisterData {
            token,
            sub_id,
            nonce,
        } = envelope.data;
        let (Some(token), Some(sub_id), Some(nonce)) =
            (non_empty(token), non_empty(sub_id), non_empty(nonce))
        else {
            return Err(PairingError::IncompleteRegistration);
        };

        let subscribe_page_url = format!(
            "{}/?sub_id={}&nonce={}",
            self.web_base_url,
            urlencoding::encode(&sub_id),
            urlencoding::encode(&nonce)
        );

        Ok(RegistrationResult {
            credential: Credential {
                token,
                sub_id,
                nonce,
            },
            subscribe_page_url,
        })
    }

    /// Tolerant pending check: any failure reads as "not subscribed yet".
    pub async fn subscription_pending(&self, credential: &Credential) -> bool {
        match self.fetch_pending(credential).await {
            Ok(pending) => pending,
            Err(error) => {
                debug!(error = %error, "pending check failed, treating as not yet subscribed");
                false
            }
        }
    }

    async fn fetch_pending(&self, credential: &Credential) -> Result<bool, reqwest::Error> {
        let url = format!("{}/subscriptions/pending", self.api_base_url);

        let envelope: Envelope<PendingData> = self
            .client
            .get(&url)
            .header(AUTHORIZATION, credential.token.as_str())
            .query(&[
                ("sub_id", credential.sub_id.as_str()),
                ("nonce", credential.nonce.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(envelope.data.id.as_deref() == Some(credential.sub_id.as_str()) && envelope.data.valid)
    }

    /// Confirm the subscription the user just approved on their phone.
    pub async fn confirm_subscription(
        &self,
        credential: &Credential,
    ) -> Result<bool, PairingError> {
        let url = format!(
            "{}/subscriptions/{}/confirmations",
            self.api_base_url,
            urlencoding::encode(&credential.sub_id)
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, credential.token.as_str())
            .json(&serde_json::json!({ "nonce": credential.nonce }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| PairingError::ConfirmationFailed {
                source: Some(source),
            })?;

        let envelope: Envelope<ConfirmationData> =
            response
                .json()
                .await
                .map_err(|source| PairingError::ConfirmationFailed {
                    source: Some(source),
                })?;

        Ok(envelope.data.success)
    }

    /// Buzz every device subscribed to the token.
    pub async fn trigger_notification(&self, token: &str) -> Result<bool, PairingError> {
        let url = format!("{}/tokens/notifications", self.api_base_url);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| PairingError::NotificationFailed {
                source: Some(source),
            })?;

        Ok(response.status() == StatusCode::OK)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
