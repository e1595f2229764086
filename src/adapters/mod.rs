//! Adapters - Implementations of port interfaces.
//!
//! - `store` - subscription stores (in-memory, Redis, PostgreSQL)
//! - `auth` - Firebase identity and test doubles
//! - `lemonsqueezy` - hosted checkout client
//! - `http` - axum router and handlers

pub mod auth;
pub mod http;
pub mod lemonsqueezy;
pub mod store;
