//! Credential lifecycle engine for Grafana Cloud API keys.
//!
//! The engine issues, renews and revokes short-lived Grafana Cloud credentials
//! on behalf of a secrets-management host. The host owns durable storage and
//! lease scheduling; the engine owns role validation, the shared upstream
//! client and the issuance protocols.

pub mod backend;
pub mod cache;
pub mod cloud;
pub mod config;
pub mod credentials;
pub mod roles;
pub mod secret;
pub mod storage;

#[cfg(test)]
mod test;

pub use backend::{Backend, WriteOperation};
