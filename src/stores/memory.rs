//! In-memory token store.
//!
//! Mutex-protected map with the same conditional-transition contract as
//! the Redis store. Suitable for tests and single-process deployments.

use crate::error::{AuthError, Result};
use crate::providers::TokenStore;
use crate::token::{Token, TokenId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// In-memory token store.
///
/// `Clone` shares the underlying map; every clone sees the same tokens.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<Mutex<HashMap<TokenId, Token>>>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    /// Whether the store holds no tokens.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn is_empty(&self) -> bool {
        self.tokens.lock().unwrap().is_empty()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn insert(&self, token: &Token) -> impl Future<Output = Result<()>> + Send {
        let tokens = Arc::clone(&self.tokens);
        let token = token.clone();

        async move {
            tokens
                .lock()
                .map_err(|_| AuthError::Storage("token store mutex poisoned".to_string()))?
                .insert(token.id, token);
            Ok(())
        }
    }

    fn get(&self, id: TokenId) -> impl Future<Output = Result<Option<Token>>> + Send {
        let tokens = Arc::clone(&self.tokens);

        async move {
            Ok(tokens
                .lock()
                .map_err(|_| AuthError::Storage("token store mutex poisoned".to_string()))?
                .get(&id)
                .cloned())
        }
    }

    fn mark_consumed(
        &self,
        id: TokenId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool>> + Send {
        let tokens = Arc::clone(&self.tokens);

        async move {
            let mut guard = tokens
                .lock()
                .map_err(|_| AuthError::Storage("token store mutex poisoned".to_string()))?;

            // Check-and-set under the lock: the conditional update that
            // serializes concurrent verifications.
            match guard.get_mut(&id) {
                Some(token) if token.consumed_at.is_none() && token.disabled_at.is_none() => {
                    token.consumed_at = Some(at);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    fn mark_disabled(
        &self,
        id: TokenId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool>> + Send {
        let tokens = Arc::clone(&self.tokens);

        async move {
            let mut guard = tokens
                .lock()
                .map_err(|_| AuthError::Storage("token store mutex poisoned".to_string()))?;

            match guard.get_mut(&id) {
                Some(token) if token.disabled_at.is_none() => {
                    token.disabled_at = Some(at);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }
}
