// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The key-value store backing refresh tokens (`spec.md` §1 lists it as an
//! external collaborator, specified only through the interface the core
//! consumes: atomic get/set/getex, `SPEC_FULL.md` §5).
//!
//! [`KvStore`] is the capability interface; [`RedisKvStore`] is the one
//! production implementation, grounded on the teacher's `redis` dependency
//! in `runtara-server`'s `Cargo.toml`.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::error::{ApiError, Result};

/// Atomic get/set/getex over string values, abstracted so the auth layer
/// does not depend on a concrete client (`spec.md` §5: "no client-side
/// locking is required").
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a value, renewing its TTL to `ttl` if present (`GetEx`
    /// semantics). Returns `None` if the key is absent or expired.
    async fn get_ex(&self, key: &str, ttl: Duration) -> Result<Option<String>>;

    /// Set a value with an expiration.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Remove a key, if present.
    async fn del(&self, key: &str) -> Result<()>;
}

/// A `redis`-backed [`KvStore`], using a [`ConnectionManager`] for
/// automatic reconnection (matching `redis::Client::get_connection_manager`
/// in the teacher's `runtara-server` usage).
#[derive(Clone)]
pub struct RedisKvStore {
    conn: ConnectionManager,
}

impl RedisKvStore {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| ApiError::InvalidArgument(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| ApiError::NodeUnreachable(format!("redis connect failed: {e}")))?;
        Ok(RedisKvStore { conn })
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get_ex(&self, key: &str, ttl: Duration) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get_ex(key, redis::Expiry::EX(ttl.as_secs().max(1) as usize))
            .await
            .map_err(|e| ApiError::NodeUnreachable(format!("redis GETEX failed: {e}")))?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| ApiError::NodeUnreachable(format!("redis SETEX failed: {e}")))?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| ApiError::NodeUnreachable(format!("redis DEL failed: {e}")))?;
        Ok(())
    }
}

/// An in-memory [`KvStore`], used by tests in place of a real Redis
/// instance.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Instant;

    /// A plain `HashMap`-backed store with manual TTL expiry checks.
    #[derive(Default)]
    pub struct MockKvStore {
        entries: Mutex<HashMap<String, (String, Instant)>>,
    }

    impl MockKvStore {
        /// An empty store.
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl KvStore for MockKvStore {
        async fn get_ex(&self, key: &str, ttl: Duration) -> Result<Option<String>> {
            let mut entries = self.entries.lock().unwrap();
            match entries.get_mut(key) {
                Some((value, expires_at)) if *expires_at > Instant::now() => {
                    *expires_at = Instant::now() + ttl;
                    Ok(Some(value.clone()))
                }
                Some(_) => {
                    entries.remove(key);
                    Ok(None)
                }
                None => Ok(None),
            }
        }

        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
            Ok(())
        }

        async fn del(&self, key: &str) -> Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }
}
