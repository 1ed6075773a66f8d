//! Calibration snapshot cache
//!
//! Gantree: L2_Calibration → CalibrationCache
//!
//! Separates acquisition from computation: calibration is fetched once per
//! system and handed out as an immutable `Arc<CalibrationSet>` snapshot
//! until its TTL runs out. Corrections never observe a half-updated set.

use crate::calibration_set::CalibrationSet;
use log::debug;
use remit_core::{RemitError, RemitResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Snapshot {
    set: Arc<CalibrationSet>,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct Stats {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// TTL cache of calibration snapshots keyed by system name
/// Gantree: CalibrationCache // 스냅샷 캐시
#[derive(Debug, Clone)]
pub struct CalibrationCache {
    /// Gantree: snapshots: HashMap<String,Snapshot> // 스냅샷 저장소
    snapshots: Arc<RwLock<HashMap<String, Snapshot>>>,
    stats: Arc<Stats>,
    ttl: Duration,
}

impl CalibrationCache {
    /// Create a cache whose snapshots expire after `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(Stats::default()),
            ttl,
        }
    }

    /// Snapshot for a system, if present and unexpired
    /// Gantree: get(system) -> Option<Arc<CalibrationSet>> // 조회
    pub fn get(&self, system: &str) -> Option<Arc<CalibrationSet>> {
        let found = self.snapshots.read().ok().and_then(|snapshots| {
            snapshots
                .get(system)
                .filter(|s| s.stored_at.elapsed() < self.ttl)
                .map(|s| Arc::clone(&s.set))
        });
        let counter = if found.is_some() {
            &self.stats.hits
        } else {
            &self.stats.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store a completed calibration as the current snapshot
    /// Gantree: insert(set) -> Arc<CalibrationSet> // 저장
    pub fn insert(&self, set: CalibrationSet) -> RemitResult<Arc<CalibrationSet>> {
        let set = Arc::new(set);
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RemitError::InternalError("calibration cache lock poisoned".into()))?;
        snapshots.insert(
            set.system_name.clone(),
            Snapshot {
                set: Arc::clone(&set),
                stored_at: Instant::now(),
            },
        );
        Ok(set)
    }

    /// Cached snapshot, or fetch, store, and return a new one
    /// Gantree: get_or_fetch(system,fetch) -> Result<Arc<CalibrationSet>> // 조회 또는 취득
    pub fn get_or_fetch<F>(&self, system: &str, fetch: F) -> RemitResult<Arc<CalibrationSet>>
    where
        F: FnOnce() -> RemitResult<CalibrationSet>,
    {
        if let Some(set) = self.get(system) {
            return Ok(set);
        }
        debug!("Fetching calibration for {}", system);
        let set = fetch()?;
        if set.system_name != system {
            return Err(RemitError::InvalidCalibrationData(format!(
                "fetched calibration for '{}' while requesting '{}'",
                set.system_name, system
            )));
        }
        self.insert(set)
    }

    /// Drop the snapshot of one system
    pub fn invalidate(&self, system: &str) {
        if let Ok(mut snapshots) = self.snapshots.write() {
            snapshots.remove(system);
        }
    }

    /// Drop every expired snapshot
    pub fn cleanup_expired(&self) {
        if let Ok(mut snapshots) = self.snapshots.write() {
            snapshots.retain(|_, s| s.stored_at.elapsed() < self.ttl);
        }
    }

    /// Number of stored snapshots (expired ones included)
    pub fn len(&self) -> usize {
        self.snapshots.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Check if no snapshot is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (
            self.stats.hits.load(Ordering::Relaxed),
            self.stats.misses.load(Ordering::Relaxed),
        )
    }

    /// Snapshot lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for CalibrationCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

// ============================================================================
// Tests
// ============================================================================
