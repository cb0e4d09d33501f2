//! # lifafa-types
//!
//! Shared types, errors, and configuration for the **Lifafa** envelope escrow.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`EnvelopeId`], [`Identity`], [`MintId`], [`EnvelopeAddress`], [`VaultAddress`]
//! - **Asset model**: [`Asset`]
//! - **Envelope model**: [`Envelope`], [`ClaimMode`], [`ClaimRecord`], [`CreateEnvelope`]
//! - **Receipts**: [`ClaimReceipt`], [`Reclaim`]
//! - **Configuration**: [`RegistryConfig`], [`ExpiryPolicy`]
//! - **Errors**: [`LifafaError`] with `LF_ERR_` prefix codes
//! - **Constants**: limits, rent reserves, claim mode codes

pub mod asset;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod ids;
pub mod receipt;

// Re-export all primary types at crate root for ergonomic imports:
//   use lifafa_types::{Envelope, ClaimMode, Identity, ...};

pub use asset::*;
pub use config::*;
pub use envelope::*;
pub use error::*;
pub use ids::*;
pub use receipt::*;

// Constants are accessed via `lifafa_types::constants::FOO`
// (not re-exported to avoid name collisions).
