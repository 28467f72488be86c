//! The annotation engine: the single entry point the transport layer uses.
//!
//! Owns the session-immutable schema and image set, plus the injected
//! progress store, and composes the validator, selector, and aggregator
//! into the operations the HTTP layer exposes. Every operation is scoped
//! to one key or one image; nothing here takes cross-annotator locks.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::answer::{AnnotationRecord, AnswerSet};
use crate::consensus::{aggregate, ConsensusRecord};
use crate::error::CoreError;
use crate::schema::Schema;
use crate::selector::ImageSet;
use crate::store::ProgressStore;

/// An annotator's completion state plus where to go next.
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    /// Images with a submission that is valid under the current schema.
    pub completed: BTreeSet<String>,
    /// Next image to present, or `None` when everything is done.
    pub next: Option<String>,
    /// Total images in the inventory.
    pub total: usize,
}

pub struct AnnotationEngine {
    schema: Arc<Schema>,
    images: Arc<ImageSet>,
    store: Arc<dyn ProgressStore>,
}

impl AnnotationEngine {
    pub fn new(schema: Schema, images: ImageSet, store: Arc<dyn ProgressStore>) -> Self {
        Self {
            schema: Arc::new(schema),
            images: Arc::new(images),
            store,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    /// The only write path: validate a submission and store it.
    ///
    /// A rejected submission is never stored, not even partially. Answers
    /// are normalized (extra keys dropped) and stamped with the server-side
    /// submission time before the upsert.
    pub async fn validate_and_store(
        &self,
        annotator_id: &str,
        image_id: &str,
        answers: &serde_json::Value,
    ) -> Result<AnnotationRecord, CoreError> {
        let annotator_id = annotator_id.trim();
        if annotator_id.is_empty() {
            return Err(CoreError::validation("", "annotator_id must be non-empty"));
        }
        if !self.images.contains(image_id) {
            return Err(CoreError::UnknownImage {
                image_id: image_id.to_string(),
            });
        }

        let normalized = self.schema.validate(answers)?;
        let record = AnnotationRecord {
            annotator_id: annotator_id.to_string(),
            image_id: image_id.to_string(),
            answers: normalized,
            submitted_at: Utc::now(),
        };
        self.store.upsert(record.clone()).await?;

        tracing::info!(
            annotator_id = record.annotator_id,
            image_id = record.image_id,
            "Annotation stored"
        );
        Ok(record)
    }

    /// Completion state and next image for one annotator.
    ///
    /// `resume_image` is the client's cached position; a stale hint falls
    /// back silently to a scan from the front rather than failing.
    pub async fn progress(
        &self,
        annotator_id: &str,
        resume_image: Option<&str>,
    ) -> Result<Progress, CoreError> {
        let completed = self.completed(annotator_id).await?;
        let next = self
            .images
            .resume(&completed, resume_image)
            .map(str::to_string);
        Ok(Progress {
            completed,
            next,
            total: self.images.len(),
        })
    }

    /// Image ids this annotator has validly completed.
    pub async fn annotated(&self, annotator_id: &str) -> Result<BTreeSet<String>, CoreError> {
        self.completed(annotator_id).await
    }

    /// Images this annotator has not yet completed, in inventory order.
    pub async fn remaining(&self, annotator_id: &str) -> Result<Vec<String>, CoreError> {
        let completed = self.completed(annotator_id).await?;
        Ok(self
            .images
            .iter()
            .filter(|id| !completed.contains(*id))
            .map(str::to_string)
            .collect())
    }

    /// The stored answer set for one `(annotator, image)` key.
    pub async fn get(
        &self,
        annotator_id: &str,
        image_id: &str,
    ) -> Result<Option<AnswerSet>, CoreError> {
        if !self.images.contains(image_id) {
            return Err(CoreError::UnknownImage {
                image_id: image_id.to_string(),
            });
        }
        Ok(self
            .store
            .get(annotator_id, image_id)
            .await?
            .map(|r| r.answers))
    }

    /// Consensus across annotators for one image.
    pub async fn consensus(&self, image_id: &str) -> Result<ConsensusRecord, CoreError> {
        if !self.images.contains(image_id) {
            return Err(CoreError::UnknownImage {
                image_id: image_id.to_string(),
            });
        }
        let records = self.store.records_for_image(image_id).await?;
        Ok(aggregate(&self.schema, image_id, &records))
    }

    /// Consensus for every image in inventory order.
    ///
    /// Images nobody has annotated are included (count 0, all questions
    /// no-consensus) so exports can show "not yet annotated" rows.
    pub async fn consensus_all(&self) -> Result<Vec<ConsensusRecord>, CoreError> {
        let mut out = Vec::with_capacity(self.images.len());
        for image_id in self.images.iter() {
            let records = self.store.records_for_image(image_id).await?;
            out.push(aggregate(&self.schema, image_id, &records));
        }
        Ok(out)
    }

    /// Every stored record, for the raw admin export.
    pub async fn export_raw(&self) -> Result<Vec<AnnotationRecord>, CoreError> {
        self.store.all_records().await
    }

    /// Completed = has a record AND that record still validates under the
    /// current schema. Records orphaned by schema drift don't count, which
    /// makes the selector re-offer those images.
    async fn completed(&self, annotator_id: &str) -> Result<BTreeSet<String>, CoreError> {
        let records = self.store.records_for_annotator(annotator_id).await?;
        Ok(records
            .into_iter()
            .filter(|r| self.schema.conforms(&r.answers))
            .map(|r| r.image_id)
            .collect())
    }
}
