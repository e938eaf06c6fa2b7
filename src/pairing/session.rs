//! Credential state for one pairing attempt.

/// Secrets minted by a successful registration.
///
/// `sub_id` and `nonce` only exist while a pairing is in flight; the
/// token is the only field that outlives the ceremony. All three are
/// produced together by the register call, so a `Credential` can never
/// hold a partial set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Long-lived auth token.
    pub token: String,
    /// Subscription id for the in-flight pairing.
    pub sub_id: String,
    /// One-time nonce proving this client started the pairing.
    pub nonce: String,
}

/// Output contract of the register operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResult {
    /// Token, sub_id and nonce minted by the server.
    pub credential: Credential,
    /// Page the user opens (or scans) to subscribe their phone.
    pub subscribe_page_url: String,
}

/// In-memory credential holder for one login attempt.
///
/// Created empty when a workflow starts, populated exactly once by the
/// registration step and read by every step after it. Dropped when the
/// workflow terminates; only the token survives, persisted by the caller.
#[derive(Debug, Default)]
pub struct PairingSession {
    registration: Option<RegistrationResult>,
}

impl PairingSession {
    /// Create a session with no credential state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the registration outcome.
    pub fn begin(&mut self, registration: RegistrationResult) {
        self.registration = Some(registration);
    }

    /// Credential minted by registration, if the session got that far.
    pub fn credential(&self) -> Option<&Credential> {
        self.registration.as_ref().map(|r| &r.credential)
    }

    /// Subscribe page URL derived from the registration response.
    pub fn subscribe_page_url(&self) -> Option<&str> {
        self.registration
            .as_ref()
            .map(|r| r.subscribe_page_url.as_str())
    }
}
