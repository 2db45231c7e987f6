//! Core library components.
//!
//! Manifest collection, secret provisioning, the fetch/push lifecycle and
//! key rotation. Nothing in here prints; the CLI owns the terminal.

pub mod config;
pub mod constants;
pub mod context;
pub mod domain;
pub mod env;
pub mod kms;
pub mod lifecycle;
pub mod manifest;
pub mod provision;
pub mod rotation;
pub mod store;
pub mod types;
