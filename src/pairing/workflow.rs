//! The pairing state machine.
//!
//! One attempt walks `Idle → Registering → AwaitingDisplay → Polling →
//! Confirming → Done`; any fatal error drops it into the terminal
//! `Failed` state. Polling is the only phase that suspends: it sleeps a
//! fixed one-second quantum before every check, so the attempt is bounded
//! by the wait threshold plus response latency.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::display::SubscribeDisplay;
use crate::error::PairingError;
use crate::pairing::session::{Credential, PairingSession};

/// Delay before every subscription poll, including the first.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Phases of the pairing ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    Idle,
    Registering,
    AwaitingDisplay,
    Polling,
    Confirming,
    Done,
    Failed,
}

/// Bounded fixed-interval retry budget for the polling phase.
///
/// Kept as a value of its own so the polling shape can later grow
/// backoff without touching the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before every attempt, including the first.
    pub interval: Duration,
    /// Maximum number of attempts before giving up.
    pub max_attempts: u64,
}

impl PollPolicy {
    /// One attempt per second for `wait_threshold` seconds.
    pub fn ticks(wait_threshold: u64) -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: wait_threshold,
        }
    }
}

/// Drives one pairing attempt: register, show the subscribe link, poll
/// until the phone confirms, then confirm the subscription server-side.
///
/// The workflow exclusively owns its [`PairingSession`]; a new attempt
/// means a new workflow.
pub struct PairingWorkflow<'a, D: SubscribeDisplay> {
    client: &'a ApiClient,
    display: &'a D,
    policy: PollPolicy,
    session: PairingSession,
    state: PairingState,
}

impl<'a, D: SubscribeDisplay> PairingWorkflow<'a, D> {
    /// Create an idle workflow with an empty session.
    pub fn new(client: &'a ApiClient, display: &'a D, wait_threshold: u64) -> Self {
        Self {
            client,
            display,
            policy: PollPolicy::ticks(wait_threshold),
            session: PairingSession::new(),
            state: PairingState::Idle,
        }
    }

    /// Current phase of the ceremony.
    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Credential state accumulated so far.
    pub fn session(&self) -> &PairingSession {
        &self.session
    }

    /// Run the ceremony to completion.
    ///
    /// On success the returned credential's token must be persisted by
    /// the caller; on failure the session dies with the workflow.
    pub async fn run(&mut self) -> Result<Credential, PairingError> {
        match self.advance().await {
            Ok(credential) => {
                self.state = PairingState::Done;
                Ok(credential)
            }
            Err(error) => {
                self.state = PairingState::Failed;
                Err(error)
            }
        }
    }

    async fn advance(&mut self) -> Result<Credential, PairingError> {
        self.state = PairingState::Registering;
        let registration = self.client.register().await?;
        let credential = registration.credential.clone();
        self.session.begin(registration);

        self.state = PairingState::AwaitingDisplay;
        // render() never fails and never blocks the ceremony.
        if let Some(url) = self.session.subscribe_page_url() {
            self.display.render(url);
        }

        self.state = PairingState::Polling;
        if !self.poll_for_subscription(&credential).await {
            return Err(PairingError::SubscriptionNotFound {
                waited_secs: self.policy.max_attempts,
            });
        }

        self.state = PairingState::Confirming;
        match self.client.confirm_subscription(&credential).await {
            Ok(true) => {
                info!("subscription confirmed");
                Ok(credential)
            }
            Ok(false) => Err(PairingError::ConfirmationFailed { source: None }),
            Err(error) => Err(error),
        }
    }

    /// Bounded fixed-interval poll.
    ///
    /// The first check happens after the first full interval, never
    /// eagerly, and every tick costs the full interval no matter how
    /// fast the remote answers.
    async fn poll_for_subscription(&self, credential: &Credential) -> bool {
        for attempt in 1..=self.policy.max_attempts {
            sleep(self.policy.interval).await;

            if self.client.subscription_pending(credential).await {
                debug!(attempt, "subscription found");
                return true;
            }

            debug!(attempt, "subscription not yet confirmed");
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Display sink that records rendered URLs instead of printing.
    #[derive(Default)]
    struct RecordingDisplay {
        urls: Mutex<Vec<String>>,
    }

    impl RecordingDisplay {
        fn rendered(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl SubscribeDisplay for RecordingDisplay {
        fn render(&self, url: &str) {
            self.urls.lock().unwrap().push(url.to_string());
        }
    }

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&Config {
            api_base_url: server.uri(),
            web_base_url: "https://chime.rs".to_string(),
            ..Config::default()
        })
    }

    async fn mount_register(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "token": "12345", "sub_id": "abc", "nonce": "xyz" }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_happy_path_reaches_done_with_credential() {
        let server = MockServer::start().await;
        mount_register(&server).await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "id": "abc", "valid": true }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/subscriptions/abc/confirmations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "success": true }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let display = RecordingDisplay::default();
        let mut workflow = PairingWorkflow::new(&client, &display, 5);

        let credential = workflow.run().await.unwrap();

        assert_eq!(workflow.state(), PairingState::Done);
        assert_eq!(credential.token, "12345");
        assert_eq!(credential.sub_id, "abc");
        assert_eq!(credential.nonce, "xyz");
        assert_eq!(
            workflow.session().credential(),
            Some(&credential),
            "session mirrors the registered credential"
        );
        assert_eq!(
            display.rendered(),
            vec!["https://chime.rs/?sub_id=abc&nonce=xyz".to_string()]
        );
    }

    #[tokio::test]
    async fn test_incomplete_registration_fails_before_display() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "token": "12345" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let display = RecordingDisplay::default();
        let mut workflow = PairingWorkflow::new(&client, &display, 5);

        let err = workflow.run().await.unwrap_err();

        assert!(matches!(err, PairingError::IncompleteRegistration));
        assert_eq!(workflow.state(), PairingState::Failed);
        assert!(display.rendered().is_empty(), "no display before a full registration");
    }

    #[tokio::test]
    async fn test_zero_threshold_never_polls() {
        let server = MockServer::start().await;
        mount_register(&server).await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "id": "abc", "valid": true }
            })))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let display = RecordingDisplay::default();
        let mut workflow = PairingWorkflow::new(&client, &display, 0);

        let err = workflow.run().await.unwrap_err();
        assert!(matches!(
            err,
            PairingError::SubscriptionNotFound { waited_secs: 0 }
        ));
    }

    #[tokio::test]
    async fn test_unsuccessful_confirmation_payload_is_fatal() {
        let server = MockServer::start().await;
        mount_register(&server).await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "id": "abc", "valid": true }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/subscriptions/abc/confirmations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "success": false }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let display = RecordingDisplay::default();
        let mut workflow = PairingWorkflow::new(&client, &display, 5);

        let err = workflow.run().await.unwrap_err();
        assert!(matches!(
            err,
            PairingError::ConfirmationFailed { source: None }
        ));
        assert_eq!(workflow.state(), PairingState::Failed);
    }

    #[test]
    fn test_poll_policy_ticks() {
        let policy = PollPolicy::ticks(90);
        assert_eq!(policy.max_attempts, 90);
        assert_eq!(policy.interval, Duration::from_secs(1));
    }
}
