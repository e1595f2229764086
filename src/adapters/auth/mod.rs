//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` and `AuthProvider` ports:
//!
//! - `firebase` - Firebase ID tokens and profile lookup
//! - `mock` - in-process doubles for tests and local runs

mod firebase;
mod mock;

pub use firebase::{FirebaseConfig, FirebaseIdentity};
pub use mock::{MockAuthProvider, MockSessionValidator};
