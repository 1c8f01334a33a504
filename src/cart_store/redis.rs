//! Redis-backed [`CartStore`].
//!
//! The revision of a key is its current value. The conditional writes run as
//! Lua scripts so the comparison and the `SET`/`DEL` happen atomically on the
//! server, which also works over the multiplexed connection manager.

use super::{CartStore, Revision, StoreError, Versioned};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError, Script};
use tracing::info;

/// ARGV[1] = "1" when a current value is expected, ARGV[2] = that value,
/// ARGV[3] = new value.
const COMPARE_AND_SWAP: &str = r#"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '0' then
    if current then return 0 end
elseif current ~= ARGV[2] then
    return 0
end
redis.call('SET', KEYS[1], ARGV[3])
return 1
"#;

/// ARGV[1] = the value the key must still hold.
const COMPARE_AND_DELETE: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        if e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
            StoreError::Connection(e.to_string())
        } else {
            StoreError::Command(e.to_string())
        }
    }
}

#[derive(Clone)]
pub struct RedisCartStore {
    conn: ConnectionManager,
    cas_script: Script,
    cad_script: Script,
}

impl RedisCartStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!("Connected to Redis cart store");
        Ok(Self {
            conn,
            cas_script: Script::new(COMPARE_AND_SWAP),
            cad_script: Script::new(COMPARE_AND_DELETE),
        })
    }
}

#[async_trait]
impl CartStore for RedisCartStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value.map(|value| Versioned {
            revision: Revision::new(value.clone()),
            value,
        }))
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&Revision>,
        value: String,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let (flag, current) = match expected {
            Some(revision) => ("1", revision.as_str()),
            None => ("0", ""),
        };
        let swapped: i32 = self
            .cas_script
            .key(key)
            .arg(flag)
            .arg(current)
            .arg(value)
            .invoke_async(&mut conn)
            .await?;
        Ok(swapped == 1)
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed)
    }

    async fn compare_and_delete(&self, key: &str, expected: &Revision) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i32 = self
            .cad_script
            .key(key)
            .arg(expected.as_str())
            .invoke_async(&mut conn)
            .await?;
        Ok(removed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into())
    }

    /// Requires a running Redis at REDIS_URL.
    #[tokio::test]
    #[ignore]
    async fn test_compare_and_swap_against_redis() {
        let store = RedisCartStore::connect(&redis_url()).await.unwrap();
        let key = "cart:test-compare-and-swap";
        store.delete(key).await.unwrap();

        assert!(store.compare_and_swap(key, None, "v1".into()).await.unwrap());
        assert!(!store.compare_and_swap(key, None, "v1b".into()).await.unwrap());

        let read = store.get(key).await.unwrap().unwrap();
        assert!(store
            .compare_and_swap(key, Some(&read.revision), "v2".into())
            .await
            .unwrap());
        assert!(!store
            .compare_and_swap(key, Some(&read.revision), "v3".into())
            .await
            .unwrap());
        assert!(!store.compare_and_delete(key, &read.revision).await.unwrap());
        let current = store.get(key).await.unwrap().unwrap().revision;
        assert!(store.compare_and_delete(key, &current).await.unwrap());
        assert_eq!(store.delete(key).await.unwrap(), 0);
    }
}
