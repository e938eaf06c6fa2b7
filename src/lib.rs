//! chime: pair your terminal with your phone and buzz it when a
//! long-running command finishes.
//!
//! One ceremony, one follow-up call: [`manager::TokenManager::login`]
//! mints (or recalls) the auth token via the pairing state machine in
//! [`pairing`], and [`manager::TokenManager::trigger_notification`]
//! spends it to buzz every subscribed device. The binary wraps both
//! around an arbitrary child command.

pub mod api;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod manager;
pub mod pairing;
pub mod store;

pub use error::{Error, Result};
