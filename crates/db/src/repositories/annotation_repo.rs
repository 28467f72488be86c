//! Repository for the `annotations` table.

use els_core::AnnotationRecord;
use sqlx::PgPool;

use crate::models::annotation::AnnotationRow;

/// Column list for annotations queries.
const COLUMNS: &str = "annotator_id, image_id, answers, submitted_at";

/// CRUD operations for annotation records.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Insert or fully replace the row for `(annotator_id, image_id)`.
    ///
    /// `ON CONFLICT .. DO UPDATE` rewrites every non-key column, so two
    /// racing submissions resolve to whichever write commits last with no
    /// field-level interleaving.
    pub async fn upsert(pool: &PgPool, record: &AnnotationRecord) -> Result<(), sqlx::Error> {
        let answers =
            serde_json::to_value(&record.answers).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        sqlx::query(
            "INSERT INTO annotations (annotator_id, image_id, answers, submitted_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (annotator_id, image_id)
             DO UPDATE SET answers = EXCLUDED.answers,
                           submitted_at = EXCLUDED.submitted_at",
        )
        .bind(&record.annotator_id)
        .bind(&record.image_id)
        .bind(answers)
        .bind(record.submitted_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find the row for one `(annotator, image)` key.
    pub async fn find(
        pool: &PgPool,
        annotator_id: &str,
        image_id: &str,
    ) -> Result<Option<AnnotationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotations
             WHERE annotator_id = $1 AND image_id = $2"
        );
        sqlx::query_as::<_, AnnotationRow>(&query)
            .bind(annotator_id)
            .bind(image_id)
            .fetch_optional(pool)
            .await
    }

    /// Image ids with a record for this annotator.
    pub async fn completed_images(
        pool: &PgPool,
        annotator_id: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT image_id FROM annotations WHERE annotator_id = $1 ORDER BY image_id",
        )
        .bind(annotator_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// All rows for one annotator.
    pub async fn list_by_annotator(
        pool: &PgPool,
        annotator_id: &str,
    ) -> Result<Vec<AnnotationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotations
             WHERE annotator_id = $1
             ORDER BY image_id"
        );
        sqlx::query_as::<_, AnnotationRow>(&query)
            .bind(annotator_id)
            .fetch_all(pool)
            .await
    }

    /// All annotators' rows for one image.
    pub async fn list_by_image(
        pool: &PgPool,
        image_id: &str,
    ) -> Result<Vec<AnnotationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotations
             WHERE image_id = $1
             ORDER BY annotator_id"
        );
        sqlx::query_as::<_, AnnotationRow>(&query)
            .bind(image_id)
            .fetch_all(pool)
            .await
    }

    /// Every row, ordered for a stable export.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AnnotationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotations
             ORDER BY annotator_id, image_id"
        );
        sqlx::query_as::<_, AnnotationRow>(&query)
            .fetch_all(pool)
            .await
    }
}
