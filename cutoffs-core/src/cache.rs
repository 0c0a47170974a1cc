use crate::types::ParseResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version constants for cache invalidation
pub mod versions {
    pub const CUTOFFS_VERSION: &str = env!("CARGO_PKG_VERSION");
    /// Bump whenever parsing semantics change for the same input + config
    pub const PARSER_VERSION: &str = "1.0.0";
}

/// Result cache key (raw input bytes + source + config → ParseResult)
///
/// Keyed before extraction so a hit skips the text source entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ResultCacheKey {
    pub input_hash: String,
    pub source: String,
    pub config_hash: String,
    pub parser_version: String,
}

impl ResultCacheKey {
    pub fn new(input_hash: String, source: &str, config_hash: String) -> Self {
        Self {
            input_hash,
            source: source.to_string(),
            config_hash,
            parser_version: versions::PARSER_VERSION.to_string(),
        }
    }

    /// Compute cache key hash for storage
    pub fn to_cache_hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&self.input_hash);
        hasher.update(&self.source);
        hasher.update(&self.config_hash);
        hasher.update(&self.parser_version);
        format!("{:x}", hasher.finalize())
    }
}

/// Cached parse result with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultCacheValue {
    pub result: ParseResult,
    pub created_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub cache_version: String,
}

impl ResultCacheValue {
    pub fn new(result: ParseResult, processing_time_ms: u64) -> Self {
        Self {
            result,
            created_at: Utc::now(),
            processing_time_ms,
            cache_version: versions::CUTOFFS_VERSION.to_string(),
        }
    }
}
