//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, identity, errors)
//! - `subscription` - Tiers, records, signature verification, and the webhook pipeline

pub mod foundation;
pub mod subscription;
