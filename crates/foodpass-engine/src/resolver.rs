//! # Worker Resolver
//!
//! Cascading lookup from a normalized scan candidate to a worker.
//!
//! ## The Cascade
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  candidate "12.345.678-9"                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. exact scan-code match          ── hit? ──► done                     │
//! │       │ miss                                                            │
//! │       ▼                                                                 │
//! │  2. exact national-id match        ── hit? ──► done                     │
//! │       │ miss                                                            │
//! │       ▼                                                                 │
//! │  3. fuzzy: strip to "123456789", search by 4-char prefix "1234",        │
//! │     then VERIFY each candidate by full stripped equality                │
//! │       │                                                                 │
//! │       ├── verified ──► done                                             │
//! │       └── prefix-only coincidence ──► rejected, keep looking            │
//! │                                                                         │
//! │  nothing left ──► NotFound (caller reports the raw input)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The verification step matters: the prefix search is a recall net, and two
//! workers can share their first four digits. A prefix hit is only accepted
//! when its fully-stripped national id or stripped, prefix-removed scan code
//! equals the stripped candidate exactly.
//!
//! Eligibility (active flags) is deliberately NOT checked here - a resolved
//! but inactive worker is a different outcome than an unknown identifier,
//! and the engine makes that distinction.

use tracing::debug;

use foodpass_core::scan::{strip_code, strip_scan_code};
use foodpass_core::WorkerProfile;

use crate::store::{StoreResult, WorkerStore};

/// Length of the stripped-code prefix used to gather fuzzy candidates.
pub const FUZZY_PREFIX_LEN: usize = 4;

/// Resolves a normalized candidate to a worker, or `None` after all stages.
pub async fn resolve(
    store: &dyn WorkerStore,
    candidate: &str,
) -> StoreResult<Option<WorkerProfile>> {
    // Stage 1: the badge itself.
    if let Some(profile) = store.find_by_scan_code(candidate).await? {
        debug!(candidate, worker = %profile.worker.id, "resolved by scan code");
        return Ok(Some(profile));
    }

    // Stage 2: a typed or paper RUT in canonical form.
    if let Some(profile) = store.find_by_national_id(candidate).await? {
        debug!(candidate, worker = %profile.worker.id, "resolved by national id");
        return Ok(Some(profile));
    }

    // Stage 3: punctuation-insensitive search with exact verification.
    let stripped = strip_code(candidate);
    let prefix: String = stripped.chars().take(FUZZY_PREFIX_LEN).collect();
    if prefix.is_empty() {
        return Ok(None);
    }

    for profile in store.search_by_prefix(&prefix).await? {
        let rut_matches = strip_code(&profile.worker.rut) == stripped;
        let scan_matches = strip_scan_code(&profile.worker.scan_code) == stripped;

        if rut_matches || scan_matches {
            debug!(candidate, worker = %profile.worker.id, "resolved by stripped match");
            return Ok(Some(profile));
        }
        // Prefix-only coincidence: not this worker.
    }

    debug!(candidate, "no worker resolved");
    Ok(None)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWorkerStore;
    use foodpass_core::scan::normalize_scan;

    fn store() -> MemoryWorkerStore {
        MemoryWorkerStore::with_workers(vec![
            ("w-1", "12345678-9", "FP-12345678-9", true, true),
            // Shares the first four stripped characters with w-1.
            ("w-2", "12349999-1", "FP-12349999-1", true, true),
        ])
    }

    #[tokio::test]
    async fn test_exact_scan_code() {
        let store = store();
        let hit = resolve(&store, "FP-12345678-9").await.unwrap().unwrap();
        assert_eq!(hit.worker.id, "w-1");
    }

    #[tokio::test]
    async fn test_exact_national_id() {
        let store = store();
        let hit = resolve(&store, "12345678-9").await.unwrap().unwrap();
        assert_eq!(hit.worker.id, "w-1");
    }

    #[tokio::test]
    async fn test_fuzzy_dotted_rut() {
        let store = store();
        let candidate = normalize_scan("12.345.678-9");
        let hit = resolve(&store, &candidate).await.unwrap().unwrap();
        assert_eq!(hit.worker.id, "w-1");
    }

    #[tokio::test]
    async fn test_prefix_coincidence_is_never_mistaken() {
        let store = store();

        // Both workers share the "1234" prefix; each exact code must resolve
        // to its own worker, never the neighbor.
        let hit = resolve(&store, "12.349.999-1").await.unwrap().unwrap();
        assert_eq!(hit.worker.id, "w-2");

        let hit = resolve(&store, "12.345.678-9").await.unwrap().unwrap();
        assert_eq!(hit.worker.id, "w-1");
    }

    #[tokio::test]
    async fn test_prefix_only_match_is_not_found() {
        let store = store();
        // Shares the prefix with both workers but matches neither in full.
        let miss = resolve(&store, "12340000-0").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_empty_candidate_is_not_found() {
        let store = store();
        assert!(resolve(&store, "").await.unwrap().is_none());
        assert!(resolve(&store, ".-").await.unwrap().is_none());
    }
}
