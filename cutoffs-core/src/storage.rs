use crate::cache::{ResultCacheKey, ResultCacheValue};
use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage abstraction for caching parse results
pub trait ResultStorage {
    fn get_result(&self, cache_key: &ResultCacheKey) -> Result<Option<ResultCacheValue>>;
    fn store_result(&self, cache_key: &ResultCacheKey, cache_value: &ResultCacheValue) -> Result<()>;
}

/// File-based storage implementation using local cache directory
pub struct FileStorage {
    cache_dir: PathBuf,
}

impl FileStorage {
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        fs::create_dir_all(cache_dir.join("results")).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;

        Ok(Self { cache_dir })
    }

    fn result_path(&self, cache_key: &ResultCacheKey) -> PathBuf {
        self.cache_dir
            .join("results")
            .join(format!("{}.json", cache_key.to_cache_hash()))
    }
}

impl ResultStorage for FileStorage {
    fn get_result(&self, cache_key: &ResultCacheKey) -> Result<Option<ResultCacheValue>> {
        let path = self.result_path(cache_key);
        if path.exists() {
            let json_str = fs::read_to_string(path)?;
            let cache_value: ResultCacheValue = serde_json::from_str(&json_str)
                .map_err(|e| anyhow!("Failed to deserialize cached ResultCacheValue: {}", e))?;
            Ok(Some(cache_value))
        } else {
            Ok(None)
        }
    }

    fn store_result(&self, cache_key: &ResultCacheKey, cache_value: &ResultCacheValue) -> Result<()> {
        let path = self.result_path(cache_key);
        let json_str = serde_json::to_string_pretty(cache_value)
            .map_err(|e| anyhow!("Failed to serialize ResultCacheValue: {}", e))?;
        fs::write(path, json_str)?;
        Ok(())
    }
}

/// Calculate hash for configuration data (for the result cache key)
pub fn calculate_config_hash<T: serde::Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Calculate hash for raw report bytes (PDF or text, before extraction)
pub fn calculate_input_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// No-op storage implementation that disables all caching
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl ResultStorage for NoOpStorage {
    fn get_result(&self, _cache_key: &ResultCacheKey) -> Result<Option<ResultCacheValue>> {
        Ok(None) // Always cache miss
    }

    fn store_result(&self, _cache_key: &ResultCacheKey, _cache_value: &ResultCacheValue) -> Result<()> {
        Ok(()) // No-op
    }
}
