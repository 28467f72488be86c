//! `ProgressStore` backed by PostgreSQL.

use std::collections::BTreeSet;

use async_trait::async_trait;
use els_core::{AnnotationRecord, CoreError, ProgressStore};

use crate::repositories::AnnotationRepo;
use crate::DbPool;

/// Adapts [`AnnotationRepo`] to the store trait the engine is built
/// against. Backend failures are logged here and surface to the core as
/// sanitized [`CoreError::Storage`] values.
pub struct PgProgressStore {
    pool: DbPool,
}

impl PgProgressStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn storage_err(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn upsert(&self, record: AnnotationRecord) -> Result<(), CoreError> {
        AnnotationRepo::upsert(&self.pool, &record)
            .await
            .map_err(storage_err)
    }

    async fn get(
        &self,
        annotator_id: &str,
        image_id: &str,
    ) -> Result<Option<AnnotationRecord>, CoreError> {
        AnnotationRepo::find(&self.pool, annotator_id, image_id)
            .await
            .map_err(storage_err)?
            .map(|row| row.into_record())
            .transpose()
    }

    async fn completed_images(&self, annotator_id: &str) -> Result<BTreeSet<String>, CoreError> {
        let images = AnnotationRepo::completed_images(&self.pool, annotator_id)
            .await
            .map_err(storage_err)?;
        Ok(images.into_iter().collect())
    }

    async fn records_for_annotator(
        &self,
        annotator_id: &str,
    ) -> Result<Vec<AnnotationRecord>, CoreError> {
        AnnotationRepo::list_by_annotator(&self.pool, annotator_id)
            .await
            .map_err(storage_err)?
            .into_iter()
            .map(|row| row.into_record())
            .collect()
    }

    async fn records_for_image(&self, image_id: &str) -> Result<Vec<AnnotationRecord>, CoreError> {
        AnnotationRepo::list_by_image(&self.pool, image_id)
            .await
            .map_err(storage_err)?
            .into_iter()
            .map(|row| row.into_record())
            .collect()
    }

    async fn all_records(&self) -> Result<Vec<AnnotationRecord>, CoreError> {
        AnnotationRepo::list_all(&self.pool)
            .await
            .map_err(storage_err)?
            .into_iter()
            .map(|row| row.into_record())
            .collect()
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(storage_err)
    }
}
