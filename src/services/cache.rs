use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::traits::{CacheError, ExclusionCache};

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Backend(e.to_string())
    }
}

/// Compare-and-set: replace the key only if its current value still equals
/// ARGV[1], with the empty string standing in for "absent". Values written
/// by this service are never empty, so the sentinel is unambiguous.
const CAS_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if current == ARGV[1] or (current == false and ARGV[1] == '') then
    redis.call('SET', KEYS[1], ARGV[2], 'PX', ARGV[3])
    return 1
end
return 0
"#;

/// Redis-backed exclusion cache.
///
/// One logical value per key, each with its own expiry; the engine's
/// day-scoped invariants rely on these per-key operations being atomic on
/// the server, so there is no client-side locking beyond connection access.
pub struct RedisCache {
    // ConnectionManager needs interior mutability for command dispatch
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    op_timeout: Duration,
}

impl RedisCache {
    pub async fn new(redis_url: &str, op_timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            op_timeout,
        })
    }

    /// Bound every round-trip; a saturated or partitioned cache must fail
    /// fast as a retryable error, never hang the request.
    async fn run<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(CacheError::Timeout),
        }
    }
}

#[async_trait]
impl ExclusionCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.redis.lock().await;
        let value = self
            .run(redis::cmd("GET").arg(key).query_async(&mut *conn))
            .await?;
        tracing::trace!("cache get: {}", key);
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.redis.lock().await;
        self.run(
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl.as_millis() as u64)
                .query_async::<()>(&mut *conn),
        )
        .await?;
        tracing::trace!("cache set: {}", key);
        Ok(())
    }

    async fn set_if_unchanged(
        &self,
        key: &str,
        prev: Option<&str>,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        let script = redis::Script::new(CAS_SCRIPT);
        let mut conn = self.redis.lock().await;
        let swapped: i64 = self
            .run(
                script
                    .key(key)
                    .arg(prev.unwrap_or_default())
                    .arg(value)
                    .arg(ttl.as_millis() as u64)
                    .invoke_async(&mut *conn),
            )
            .await?;
        Ok(swapped == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_set_get_roundtrip() {
        let cache = RedisCache::new("redis://127.0.0.1:6379", Duration::from_secs(10))
            .await
            .expect("Failed to connect to Redis");

        cache
            .set("amora:test:roundtrip", "123,1234", Duration::from_secs(60))
            .await
            .unwrap();
        let value = cache.get("amora:test:roundtrip").await.unwrap();
        assert_eq!(value.as_deref(), Some("123,1234"));
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_compare_and_swap_detects_conflict() {
        let cache = RedisCache::new("redis://127.0.0.1:6379", Duration::from_secs(10))
            .await
            .expect("Failed to connect to Redis");

        let key = "amora:test:cas";
        let ttl = Duration::from_secs(60);

        assert!(cache.set_if_unchanged(key, None, "123", ttl).await.unwrap());
        // Stale expectation must lose
        assert!(!cache.set_if_unchanged(key, None, "456", ttl).await.unwrap());
        assert!(cache
            .set_if_unchanged(key, Some("123"), "123,1234", ttl)
            .await
            .unwrap());
        let value = cache.get(key).await.unwrap();
        assert_eq!(value.as_deref(), Some("123,1234"));
    }
}
