//! # lifafa-registry
//!
//! The envelope state machine on top of [`lifafa_vault`].
//!
//! - [`EnvelopeRegistry`]: `create` / `claim` / `delete` plus read-only
//!   observation, safe to share across threads
//! - [`split`]: Equal and Random payout sizing
//! - [`XorShiftRng`]: deterministic slot-seeded generator for replayable
//!   Random-mode draws
//!
//! ```text
//!   owner ──create──▶ ┌──────────┐ ──claim──▶ claimant wallet
//!                     │ envelope │
//!                     │  + vault │
//!   owner ◀─delete─── └──────────┘
//! ```

pub mod registry;
pub mod rng;
pub mod split;

pub use registry::EnvelopeRegistry;
pub use rng::XorShiftRng;
