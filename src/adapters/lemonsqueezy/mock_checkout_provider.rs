//! Mock checkout provider for testing.
//!
//! Records every request and answers with a configurable URL or error.
//!
//! ```ignore
//! let mock = MockCheckoutProvider::new();
//! mock.fail_with(CheckoutError::Network("reset".into()));
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{CheckoutError, CheckoutProvider, CheckoutRequest, CheckoutSession};

const DEFAULT_URL: &str = "https://checkout.test/session";

#[derive(Clone, Default)]
pub struct MockCheckoutProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    checkout_url: Option<String>,
    error: Option<CheckoutError>,
    requests: Vec<CheckoutRequest>,
}

impl MockCheckoutProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL returned by every successful call.
    pub fn with_url(url: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state().checkout_url = Some(url.into());
        mock
    }

    /// Makes every later call fail with `error`.
    pub fn fail_with(&self, error: CheckoutError) {
        self.state().error = Some(error);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.state().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError> {
        let mut state = self.state();
        state.requests.push(request.clone());

        if let Some(error) = state.error.clone() {
            return Err(error);
        }

        let checkout_url = state
            .checkout_url
            .clone()
            .unwrap_or_else(|| format!("{}/{}", DEFAULT_URL, request.variant_id));
        Ok(CheckoutSession { checkout_url })
    }
}
