//! Device pairing ceremony.
//!
//! First run only: register for a token, show a subscribe link the user
//! opens on their phone, poll until the phone subscribes, then confirm.
//! The token that falls out is persisted and reused forever after.

mod session;
mod workflow;

pub use session::{Credential, PairingSession, RegistrationResult};
pub use workflow::{PairingState, PairingWorkflow, PollPolicy};
