//! Row type for the `annotations` table.

use els_core::{AnnotationRecord, AnswerSet, CoreError};
use sqlx::FromRow;

/// A row from the `annotations` table. `answers` holds the normalized
/// answer set as JSONB, exactly as the validator produced it.
#[derive(Debug, Clone, FromRow)]
pub struct AnnotationRow {
    pub annotator_id: String,
    pub image_id: String,
    pub answers: serde_json::Value,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl AnnotationRow {
    /// Convert into the core record, decoding the stored answer set.
    ///
    /// A row that fails to decode is a storage-level fault (the write path
    /// only ever persists validator output), so it surfaces as
    /// [`CoreError::Storage`] rather than a validation error.
    pub fn into_record(self) -> Result<AnnotationRecord, CoreError> {
        let answers: AnswerSet = serde_json::from_value(self.answers)
            .map_err(|e| CoreError::Storage(format!("undecodable answers column: {e}")))?;
        Ok(AnnotationRecord {
            annotator_id: self.annotator_id,
            image_id: self.image_id,
            answers,
            submitted_at: self.submitted_at,
        })
    }
}
