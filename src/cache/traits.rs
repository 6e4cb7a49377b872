use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    ExistsButNoValue, // 后端异常，无法判断
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    // ttl 为 0 时使用默认 TTL
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

/// JSON 序列化读写的便捷方法
#[async_trait]
pub trait ObjectCacheExt {
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T>;
    async fn insert_json<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: u64);
}

#[async_trait]
impl<C: ObjectCache + ?Sized> ObjectCacheExt for C {
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        match self.get_raw(key).await {
            CacheResult::Found(json) => match serde_json::from_str(&json) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Dropping undecodable cache entry {}: {}", key, e);
                    self.remove(key).await;
                    None
                }
            },
            _ => None,
        }
    }

    async fn insert_json<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: u64) {
        if let Ok(json) = serde_json::to_string(value) {
            self.insert_raw(key.to_string(), json, ttl).await;
        }
    }
}
