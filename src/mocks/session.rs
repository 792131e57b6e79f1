//! Mock session gateway for testing.

use crate::error::{AuthError, Result};
use crate::providers::{SessionGateway, User};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock session gateway.
///
/// Records every established session.
#[derive(Debug, Clone, Default)]
pub struct MockSessionGateway {
    established: Arc<Mutex<Vec<User>>>,
}

impl MockSessionGateway {
    /// Create a new mock gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Users that have been logged in, in order.
    #[must_use]
    pub fn established(&self) -> Vec<User> {
        self.established
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl SessionGateway for MockSessionGateway {
    fn establish(&self, user: &User) -> impl Future<Output = Result<()>> + Send {
        let established = Arc::clone(&self.established);
        let user = user.clone();

        async move {
            established
                .lock()
                .map_err(|_| AuthError::Storage("session gateway mutex poisoned".to_string()))?
                .push(user);

            Ok(())
        }
    }
}
