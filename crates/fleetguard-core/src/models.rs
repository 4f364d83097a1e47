//! Domain models for FleetGuard authentication.
//!
//! These are the core types shared across all crates.

pub mod account;
pub mod login_attempt;
