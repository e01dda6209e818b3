//! In-memory store for completed analysis results.

use crate::types::{AnalysisRecord, AnalysisResult};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct StoreInner {
    next_id: u64,
    results: BTreeMap<u64, AnalysisResult>,
}

/// Shared handle to the result table. Clones refer to the same table.
///
/// Ids start at 1 and increase by one per save. Nothing is ever evicted and
/// nothing survives a restart.
#[derive(Debug, Clone)]
pub struct ResultStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                next_id: 1,
                results: BTreeMap::new(),
            })),
        }
    }

    /// Store a record under a fresh id and return the stored copy.
    pub fn save(&self, record: AnalysisRecord) -> AnalysisResult {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        let result = AnalysisResult { id, record };
        inner.results.insert(id, result.clone());
        result
    }

    pub fn get(&self, id: u64) -> Option<AnalysisResult> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.results.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisDraft, Category, Severity, Vulnerability};
    use chrono::Utc;

    fn record(name: &str) -> AnalysisRecord {
        let finding = Vulnerability {
            rule_id: "BACKDOOR-003".to_string(),
            name: "Self-destruct".to_string(),
            description: "d".to_string(),
            category: Category::Backdoor,
            severity: Severity::Critical,
            line_start: 3,
            line_end: 3,
            impact: "i".to_string(),
            recommendations: "r".to_string(),
        };
        AnalysisDraft::new(name.to_string(), "contract X {}".to_string(), vec![finding])
            .timed(Utc::now(), 12)
    }

    #[test]
    fn test_round_trip() {
        let store = ResultStore::new();
        let original = record("X");
        let saved = store.save(original.clone());
        let fetched = store.get(saved.id).unwrap();

        assert_eq!(fetched, saved);
        assert_eq!(fetched.record, original);
    }

    #[test]
    fn test_ids_increase() {
        let store = ResultStore::new();
        let a = store.save(record("A"));
        let b = store.save(record("B"));
        let c = store.save(record("C"));

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert_eq!(store.get(2).unwrap().contract_name(), "B");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_missing_id() {
        let store = ResultStore::new();
        assert!(store.is_empty());
        assert!(store.get(1).is_none());
        assert!(store.get(0).is_none());
    }

    #[test]
    fn test_clones_share_table() {
        let store = ResultStore::new();
        let handle = store.clone();
        let saved = handle.save(record("Shared"));
        assert!(store.get(saved.id).is_some());
    }

    #[test]
    fn test_isolated_instances() {
        let first = ResultStore::new();
        let second = ResultStore::new();
        first.save(record("A"));
        assert!(second.get(1).is_none());
        assert_eq!(second.save(record("B")).id, 1);
    }

    #[test]
    fn test_serialized_result_is_flat() {
        let store = ResultStore::new();
        let saved = store.save(record("Flat"));
        let json = serde_json::to_value(&saved).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["contractName"], "Flat");
        assert_eq!(json["criticalCount"], 1);
        assert_eq!(json["overallRisk"], "critical");
        assert_eq!(json["scanDuration"], 12);
        assert!(json["scanTime"].is_string());

        let back: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, saved);
    }
}
