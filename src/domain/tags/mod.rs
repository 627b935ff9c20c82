//! Global tag catalog.
//!
//! Every placeholder label seen in any notification template is recorded
//! once in the catalog. Population is best-effort: the registry never fails
//! the notification write that triggered it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::TagMetrics;
use crate::storage::TagRepository;

/// Maximum label length accepted into the catalog
pub const MAX_LABEL_LEN: usize = 50;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            created_at: Utc::now(),
        }
    }
}

/// Counts from one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub inserted: usize,
    pub existing: usize,
    pub failed: usize,
}

/// Idempotent upsert service over the tag catalog.
#[derive(Clone)]
pub struct TagRegistry {
    repo: Arc<dyn TagRepository>,
}

impl TagRegistry {
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// Make sure every label is present in the catalog.
    ///
    /// Labels are processed one by one, repeats included. A concurrent writer
    /// winning the insert race surfaces as a duplicate key and counts as
    /// already present. Any other failure is logged and skipped.
    pub async fn reconcile(&self, labels: &[String]) -> ReconcileStats {
        let mut stats = ReconcileStats::default();

        for label in labels {
            if label.chars().count() > MAX_LABEL_LEN {
                stats.failed += 1;
                TagMetrics::record_failure();
                tracing::warn!(label = %label, "Tag label too long, not added to catalog");
                continue;
            }

            match self.repo.find_by_label(label).await {
                Ok(Some(_)) => {
                    stats.existing += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    stats.failed += 1;
                    TagMetrics::record_failure();
                    tracing::warn!(label = %label, error = %e, "Tag lookup failed during reconciliation");
                    continue;
                }
            }

            match self.repo.insert(&Tag::new(label.clone())).await {
                Ok(()) => {
                    stats.inserted += 1;
                    TagMetrics::record_inserted();
                    tracing::debug!(label = %label, "Tag added to catalog");
                }
                Err(e) if e.is_duplicate_key() => {
                    stats.existing += 1;
                }
                Err(e) => {
                    stats.failed += 1;
                    TagMetrics::record_failure();
                    tracing::warn!(label = %label, error = %e, "Failed to insert tag into catalog");
                }
            }
        }

        stats
    }

    /// All catalog labels in ascending order.
    pub async fn list_labels(&self) -> crate::domain::CatalogResult<Vec<String>> {
        let tags = self.repo.list().await?;
        Ok(tags.into_iter().map(|t| t.label).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoreError, StoreResult};
    use async_trait::async_trait;

    fn registry() -> (TagRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (TagRegistry::new(store.clone()), store)
    }

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let (registry, store) = registry();

        registry.reconcile(&labels(&["x"])).await;
        let second = registry.reconcile(&labels(&["x"])).await;

        assert_eq!(second.inserted, 0);
        assert_eq!(second.existing, 1);
        let all = TagRepository::list(store.as_ref()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].label, "x");
    }

    #[tokio::test]
    async fn test_reconcile_repeated_label_in_one_pass() {
        let (registry, _) = registry();
        let stats = registry.reconcile(&labels(&["a", "b", "a"])).await;
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.existing, 1);
        assert_eq!(registry.list_labels().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_overlong_label_skipped() {
        let (registry, _) = registry();
        let stats = registry
            .reconcile(&labels(&[&"x".repeat(MAX_LABEL_LEN + 1), "ok"]))
            .await;
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.inserted, 1);
    }

    /// Simulates a writer that lost the race: lookups miss, inserts collide.
    struct RacingTags;

    #[async_trait]
    impl TagRepository for RacingTags {
        async fn find_by_label(&self, _label: &str) -> StoreResult<Option<Tag>> {
            Ok(None)
        }

        async fn insert(&self, tag: &Tag) -> StoreResult<()> {
            Err(StoreError::DuplicateKey(tag.label.clone()))
        }

        async fn list(&self) -> StoreResult<Vec<Tag>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_duplicate_key_treated_as_present() {
        let registry = TagRegistry::new(Arc::new(RacingTags));
        let stats = registry.reconcile(&labels(&["x"])).await;
        assert_eq!(
            stats,
            ReconcileStats {
                inserted: 0,
                existing: 1,
                failed: 0
            }
        );
    }

    struct BrokenTags;

    #[async_trait]
    impl TagRepository for BrokenTags {
        async fn find_by_label(&self, _label: &str) -> StoreResult<Option<Tag>> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn insert(&self, _tag: &Tag) -> StoreResult<()> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn list(&self) -> StoreResult<Vec<Tag>> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_raised() {
        let registry = TagRegistry::new(Arc::new(BrokenTags));
        let stats = registry.reconcile(&labels(&["a", "b"])).await;
        assert_eq!(stats.failed, 2);
    }
}
