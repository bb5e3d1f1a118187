//! In-memory caching using moka
//!
//! Customers reload their quote and checkout pages repeatedly while the quote
//! itself rarely changes, so public summaries are cached and invalidated on
//! admin edits.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::quotes::responses::QuoteSummary;

/// Application cache holding public quote summaries
#[derive(Clone)]
pub struct AppCache {
    /// Quote summaries (quote id -> QuoteSummary)
    pub quotes: Cache<Uuid, Arc<QuoteSummary>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // 1000 entries, 10 min TTL, 5 min idle
            quotes: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(Duration::from_secs(10 * 60))
                .time_to_idle(Duration::from_secs(5 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            quotes_size: self.quotes.entry_count(),
        }
    }

    /// Drop a cached quote after it changes
    pub async fn invalidate_quote(&self, id: Uuid) {
        self.quotes.invalidate(&id).await;
        info!("Cache invalidated for quote: {}", id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub quotes_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::models::fixtures;

    #[tokio::test]
    async fn test_invalidate_quote() {
        let cache = AppCache::new();
        let summary = QuoteSummary::try_from(&fixtures::quote()).unwrap();
        let id = summary.id;

        cache.quotes.insert(id, Arc::new(summary)).await;
        assert!(cache.quotes.get(&id).await.is_some());

        cache.invalidate_quote(id).await;
        assert!(cache.quotes.get(&id).await.is_none());
    }
}
