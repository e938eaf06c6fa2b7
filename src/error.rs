//! Error types for chime.

/// Top-level error type for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pairing(#[from] PairingError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Credential store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration directory not found")]
    NoConfigDir,
}

/// Pairing ceremony and notification errors.
///
/// Every variant is fatal for the attempt that raised it. The display
/// message is what the CLI shows; network causes ride along as `#[source]`
/// for debug-level diagnostics and are never printed by default.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    /// The register call failed at the transport or server level.
    #[error("Unable to register for token")]
    RegistrationFailed {
        #[source]
        source: reqwest::Error,
    },

    /// Register answered 2xx but the payload was missing required fields.
    #[error("No token information in registration response")]
    IncompleteRegistration,

    /// The polling budget ran out before the phone confirmed.
    #[error("No subscription found within the {waited_secs}s wait threshold")]
    SubscriptionNotFound { waited_secs: u64 },

    #[error("Unable to confirm subscription")]
    ConfirmationFailed {
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Unable to trigger notification")]
    NotificationFailed {
        #[source]
        source: Option<reqwest::Error>,
    },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
