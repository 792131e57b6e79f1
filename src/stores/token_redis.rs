//! Redis-based token store implementation.
//!
//! # Architecture
//!
//! Token records are stored as JSON under `auth:link:{token_id}` keys.
//! Records are not given a TTL: consumed and disabled tokens must remain
//! readable so replayed links report "invalid" rather than vanishing, and
//! retention of stale rows is an operational concern outside the core.
//!
//! # Atomicity
//!
//! The terminal transitions (`mark_consumed`, `mark_disabled`) run as Lua
//! scripts, so the check ("still non-terminal?") and the write happen as
//! one server-side step. Two concurrent verifications of the same token
//! observe exactly one `true` between them.
//!
//! # Keys
//!
//! The `auth:link:` prefix namespaces this store in shared Redis
//! instances and gives operational sweeps a precise target.

use crate::error::{AuthError, Result};
use crate::providers::TokenStore;
use crate::token::{Token, TokenId};
use chrono::{DateTime, SecondsFormat, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use std::future::Future;

// Transition scripts: absent terminal fields are omitted from the JSON
// (see Token's serde attributes), so presence is the terminality test.
const CONSUME_SCRIPT: &str = r"
local raw = redis.call('GET', KEYS[1])
if not raw then return 0 end
local record = cjson.decode(raw)
if record.consumed_at or record.disabled_at then return 0 end
record.consumed_at = ARGV[1]
redis.call('SET', KEYS[1], cjson.encode(record))
return 1
";

const DISABLE_SCRIPT: &str = r"
local raw = redis.call('GET', KEYS[1])
if not raw then return 0 end
local record = cjson.decode(raw)
if record.disabled_at then return 0 end
record.disabled_at = ARGV[1]
redis.call('SET', KEYS[1], cjson.encode(record))
return 1
";

/// Redis-based token store.
///
/// # Thread Safety
///
/// `Clone` shares the underlying [`ConnectionManager`] (connection pool),
/// so the store can be handed to every request handler.
pub struct RedisTokenStore {
    conn_manager: ConnectionManager,
    consume_script: Script,
    disable_script: Script,
}

impl RedisTokenStore {
    /// Create a new Redis token store.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "<redis://127.0.0.1:6379>")
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if:
    /// - the URL is malformed
    /// - the connection to the Redis server fails
    /// - authentication fails
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AuthError::Storage(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::Storage(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("RedisTokenStore initialized successfully");

        Ok(Self {
            conn_manager,
            consume_script: Script::new(CONSUME_SCRIPT),
            disable_script: Script::new(DISABLE_SCRIPT),
        })
    }

    /// The Redis key for a token.
    fn token_key(id: TokenId) -> String {
        format!("auth:link:{id}")
    }

    async fn run_transition(
        &self,
        script: &Script,
        id: TokenId,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = self.conn_manager.clone();

        let fired: i64 = script
            .key(Self::token_key(id))
            .arg(at.to_rfc3339_opts(SecondsFormat::Micros, true))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to update token: {e}")))?;

        Ok(fired == 1)
    }
}

impl Clone for RedisTokenStore {
    fn clone(&self) -> Self {
        Self {
            conn_manager: self.conn_manager.clone(),
            consume_script: Script::new(CONSUME_SCRIPT),
            disable_script: Script::new(DISABLE_SCRIPT),
        }
    }
}

impl TokenStore for RedisTokenStore {
    fn insert(&self, token: &Token) -> impl Future<Output = Result<()>> + Send {
        let mut conn = self.conn_manager.clone();
        let key = Self::token_key(token.id);
        let record = serde_json::to_string(token);
        let token_id = token.id;

        async move {
            let record = record.map_err(|e| AuthError::Serialization(e.to_string()))?;

            let _: () = conn
                .set(&key, record)
                .await
                .map_err(|e| AuthError::Storage(format!("Failed to store token: {e}")))?;

            tracing::info!(token_id = %token_id, "Stored token in Redis");

            Ok(())
        }
    }

    fn get(&self, id: TokenId) -> impl Future<Output = Result<Option<Token>>> + Send {
        let mut conn = self.conn_manager.clone();
        let key = Self::token_key(id);

        async move {
            let raw: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| AuthError::Storage(format!("Failed to fetch token: {e}")))?;

            raw.map(|json| {
                serde_json::from_str(&json).map_err(|e| AuthError::Serialization(e.to_string()))
            })
            .transpose()
        }
    }

    fn mark_consumed(
        &self,
        id: TokenId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool>> + Send {
        async move {
            let fired = self.run_transition(&self.consume_script, id, at).await?;
            if fired {
                tracing::info!(token_id = %id, "Token consumed (single-use)");
            }
            Ok(fired)
        }
    }

    fn mark_disabled(
        &self,
        id: TokenId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool>> + Send {
        async move {
            let fired = self.run_transition(&self.disable_script, id, at).await?;
            if fired {
                tracing::info!(token_id = %id, "Token disabled");
            }
            Ok(fired)
        }
    }
}
