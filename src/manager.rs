//! Token lifecycle orchestration.

use tracing::{debug, info};

use crate::api::ApiClient;
use crate::config::Config;
use crate::display::SubscribeDisplay;
use crate::error::{Error, PairingError, StoreError};
use crate::pairing::PairingWorkflow;
use crate::store::{CredentialStore, TOKEN_KEY};

/// Owns the auth token: recalls it from the store, runs the pairing
/// ceremony when there is none, and spends it on notifications.
pub struct TokenManager<S: CredentialStore, D: SubscribeDisplay> {
    config: Config,
    client: ApiClient,
    store: S,
    display: D,
    token: Option<String>,
}

impl<S: CredentialStore, D: SubscribeDisplay> TokenManager<S, D> {
    /// Build a manager, loading any previously persisted token.
    pub fn new(config: Config, store: S, display: D) -> Result<Self, Error> {
        let client = ApiClient::new(&config);
        let token = store.get(TOKEN_KEY)?;
        debug!(has_token = token.is_some(), "token manager initialized");

        Ok(Self {
            config,
            client,
            store,
            display,
            token,
        })
    }

    /// Return the persisted token, or run the pairing ceremony to mint one.
    ///
    /// A stored token is trusted as-is, with no network traffic at all.
    /// Workflow failures propagate unchanged.
    pub async fn login(&mut self) -> Result<String, Error> {
        if let Some(token) = &self.token {
            debug!("using persisted token");
            return Ok(token.clone());
        }

        info!("no persisted token, starting pairing");
        let mut workflow =
            PairingWorkflow::new(&self.client, &self.display, self.config.wait_threshold);
        let credential = workflow.run().await?;

        self.save_token(&credential.token)?;
        self.token = Some(credential.token.clone());
        Ok(credential.token)
    }

    /// Buzz every device paired with the current token.
    pub async fn trigger_notification(&self) -> Result<bool, Error> {
        let token = self
            .token
            .as_deref()
            .ok_or(PairingError::NotificationFailed { source: None })?;

        Ok(self.client.trigger_notification(token).await?)
    }

    /// Persist a token through the store.
    pub fn save_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(TOKEN_KEY, token)
    }
}
