//! The injected progress store.
//!
//! Storage is a capability handed to the engine, not something the domain
//! logic owns: the validator, selector, and aggregator never touch a
//! backend directly. [`MemoryStore`] backs tests and no-database
//! deployments; `els-db` provides the PostgreSQL implementation.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::answer::AnnotationRecord;
use crate::error::CoreError;

/// Durable mapping of `(annotator_id, image_id)` to the latest submission.
///
/// Implementations must treat `upsert` as a full replacement of the row:
/// two writers racing on the same key resolve to whichever write lands
/// last, never to a field-level mix of the two.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Insert or fully replace the record for its `(annotator, image)` key.
    async fn upsert(&self, record: AnnotationRecord) -> Result<(), CoreError>;

    /// The latest record for one key, if any.
    async fn get(
        &self,
        annotator_id: &str,
        image_id: &str,
    ) -> Result<Option<AnnotationRecord>, CoreError>;

    /// Image ids with any record for this annotator (validity against the
    /// current schema is the engine's concern, not the store's).
    async fn completed_images(&self, annotator_id: &str) -> Result<BTreeSet<String>, CoreError>;

    /// All records for one annotator.
    async fn records_for_annotator(
        &self,
        annotator_id: &str,
    ) -> Result<Vec<AnnotationRecord>, CoreError>;

    /// All annotators' records for one image.
    async fn records_for_image(&self, image_id: &str) -> Result<Vec<AnnotationRecord>, CoreError>;

    /// Every stored record (raw admin export).
    async fn all_records(&self) -> Result<Vec<AnnotationRecord>, CoreError>;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;

    /// Backend liveness probe. In-memory stores are always healthy.
    async fn health(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// In-memory store: a map behind an async `RwLock`.
///
/// Writes to different keys don't interfere; writes to the same key are
/// serialized by the lock, so the last writer wins wholesale.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(String, String), AnnotationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn upsert(&self, record: AnnotationRecord) -> Result<(), CoreError> {
        let key = (record.annotator_id.clone(), record.image_id.clone());
        self.records.write().await.insert(key, record);
        Ok(())
    }

    async fn get(
        &self,
        annotator_id: &str,
        image_id: &str,
    ) -> Result<Option<AnnotationRecord>, CoreError> {
        let key = (annotator_id.to_string(), image_id.to_string());
        Ok(self.records.read().await.get(&key).cloned())
    }

    async fn completed_images(&self, annotator_id: &str) -> Result<BTreeSet<String>, CoreError> {
        Ok(self
            .records
            .read()
            .await
            .keys()
            .filter(|(annotator, _)| annotator == annotator_id)
            .map(|(_, image)| image.clone())
            .collect())
    }

    async fn records_for_annotator(
        &self,
        annotator_id: &str,
    ) -> Result<Vec<AnnotationRecord>, CoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.annotator_id == annotator_id)
            .cloned()
            .collect())
    }

    async fn records_for_image(&self, image_id: &str) -> Result<Vec<AnnotationRecord>, CoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.image_id == image_id)
            .cloned()
            .collect())
    }

    async fn all_records(&self) -> Result<Vec<AnnotationRecord>, CoreError> {
        let mut records: Vec<AnnotationRecord> =
            self.records.read().await.values().cloned().collect();
        // HashMap iteration order is arbitrary; exports should be stable.
        records.sort_by(|a, b| {
            (&a.annotator_id, &a.image_id).cmp(&(&b.annotator_id, &b.image_id))
        });
        Ok(records)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
