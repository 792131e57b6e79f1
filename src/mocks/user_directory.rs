//! Mock user directory for testing.

use crate::error::{AuthError, Result};
use crate::providers::{User, UserDirectory};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock user directory.
///
/// Seedable in-memory account lookup.
#[derive(Debug, Clone, Default)]
pub struct MockUserDirectory {
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl MockUserDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account, keyed by its lower-cased email.
    pub fn add_user(&self, user: User) {
        if let Ok(mut guard) = self.users.lock() {
            guard.insert(user.email.to_lowercase(), user);
        }
    }
}

impl UserDirectory for MockUserDirectory {
    fn find_by_email(&self, email: &str) -> impl Future<Output = Result<User>> + Send {
        let users = Arc::clone(&self.users);
        let email = email.to_lowercase();

        async move {
            users
                .lock()
                .map_err(|_| AuthError::Storage("user directory mutex poisoned".to_string()))?
                .get(&email)
                .cloned()
                .ok_or(AuthError::UserNotFound)
        }
    }
}
