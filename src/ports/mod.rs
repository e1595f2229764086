//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SubscriptionStore` - key-value persistence of subscription records
//! - `SessionValidator` - identity token verification
//! - `AuthProvider` - user profile lookup
//! - `CheckoutProvider` - hosted checkout creation at the payment provider

mod auth_provider;
mod checkout_provider;
mod session_validator;
mod subscription_store;

pub use auth_provider::AuthProvider;
pub use checkout_provider::{CheckoutError, CheckoutProvider, CheckoutRequest, CheckoutSession};
pub use session_validator::SessionValidator;
pub use subscription_store::SubscriptionStore;
