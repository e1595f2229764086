//! Subscription Sync - LemonSqueezy subscription state for Firebase users
//!
//! Receives payment-provider webhooks, keeps one subscription record per
//! user, and serves tier and subscription lookups to authenticated callers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
