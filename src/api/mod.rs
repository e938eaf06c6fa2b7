//! HTTP adapter for the chime notification service.

mod client;

pub use client::ApiClient;
