//! In-memory caching using moka
//!
//! Caches tariff snapshots and utility type reference data. Tier schedules
//! are edited by household administrators, so snapshot TTLs are short;
//! reference data barely changes and gets a long TTL plus a warmer.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::metering::models::{TariffSnapshot, UtilityType};
use crate::metering::queries;

/// Cache key of the single utility type listing entry.
pub const UTILITY_TYPES_KEY: &str = "utility_types:active";

/// Application cache holding tariff snapshots and reference data
#[derive(Clone)]
pub struct AppCache {
    /// Tariff snapshots ((utility, household) -> TariffSnapshot)
    pub snapshots: Cache<String, Arc<TariffSnapshot>>,
    /// Active utility types (singleton listing)
    pub utility_types: Cache<String, Arc<Vec<UtilityType>>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Tariff snapshots: 1000 entries, 5 min TTL, 2 min idle.
            // Short on purpose: a stale schedule bills a household wrong.
            snapshots: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(5 * 60))
                .time_to_idle(Duration::from_secs(2 * 60))
                .build(),

            // Utility types: 1 entry, 1 hour TTL (reference data)
            utility_types: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(60 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            snapshots_size: self.snapshots.entry_count(),
            utility_types_cached: self.utility_types.entry_count() > 0,
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.snapshots.invalidate_all();
        self.utility_types.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate the snapshot of one (utility, household) pair after a
    /// tariff edit
    pub async fn invalidate_snapshot(&self, utility_type_id: Uuid, household_id: Uuid) {
        let key = Self::snapshot_key(utility_type_id, household_id);
        self.snapshots.invalidate(&key).await;
        info!("Cache invalidated for snapshot: {}", key);
    }

    /// Generate cache key for a tariff snapshot
    pub fn snapshot_key(utility_type_id: Uuid, household_id: Uuid) -> String {
        format!("tariff:{}:{}", utility_type_id, household_id)
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
    pub snapshots_size: u64,
    pub utility_types_cached: bool,
}

/// Start background cache warmer
///
/// Warms reference data on startup and refreshes every 30 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    // Initial warm-up
    warm_cache(&cache, &db).await;

    let mut interval = interval(Duration::from_secs(30 * 60));
    loop {
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Warm the cache with reference data
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    match queries::get_utility_types(db).await {
        Ok(types) => {
            cache
                .utility_types
                .insert(UTILITY_TYPES_KEY.to_string(), Arc::new(types))
                .await;
        }
        Err(e) => warn!("Failed to warm utility type cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
