//! LemonSqueezy payment provider adapter.
//!
//! Implements the `CheckoutProvider` port against the LemonSqueezy JSON:API.
//! Webhook verification lives in the domain; this module only talks to the
//! provider's REST API.
//!
//! # Security
//!
//! The API key is held as a `secrecy::SecretString` and only exposed when the
//! `Authorization` header is built.

mod checkout_adapter;
mod mock_checkout_provider;

pub use checkout_adapter::{LemonSqueezyCheckoutAdapter, LemonSqueezyConfig};
pub use mock_checkout_provider::MockCheckoutProvider;
