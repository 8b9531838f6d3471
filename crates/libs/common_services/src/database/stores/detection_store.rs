use crate::database::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common_types::form_detection::{
    CreateDetection, DetectedField, DetectionRecord, FieldStatus, ReviewDecision,
};
use common_types::PageDimensions;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Persistence for per-page detection records.
#[async_trait]
pub trait DetectionStore: Send + Sync {
    /// Stores a new record. The store assigns `id` and `created_at`.
    async fn insert(&self, detection: CreateDetection) -> Result<DetectionRecord, DbError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DetectionRecord>, DbError>;

    /// All records of a template, newest first.
    async fn list_by_template(&self, template_id: Uuid) -> Result<Vec<DetectionRecord>, DbError>;

    /// Applies a review to record `id` of `template_id` as one atomic step.
    ///
    /// Concurrent reviews of the same record are serialized, so a field leaves `pending`
    /// at most once.
    async fn review_fields(
        &self,
        template_id: Uuid,
        id: Uuid,
        detection_ids: &[i64],
        decision: ReviewDecision,
    ) -> Result<ReviewOutcome, DbError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;

    async fn health_check(&self) -> Result<(), DbError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    Applied {
        record: DetectionRecord,
        updated_count: usize,
    },
    NotFound,
    InvalidIndex(i64),
    AlreadyReviewed {
        index: usize,
        status: FieldStatus,
    },
}

/// Validates every index of a review, then moves those fields out of `pending`.
///
/// Nothing changes unless every index is in range and still pending. Repeated indices
/// count once.
#[must_use]
pub fn apply_review(
    mut record: DetectionRecord,
    detection_ids: &[i64],
    decision: ReviewDecision,
) -> ReviewOutcome {
    let field_count = record.detected_fields.len();
    let mut indices = BTreeSet::new();
    for &id in detection_ids {
        match usize::try_from(id).ok().filter(|index| *index < field_count) {
            Some(index) => indices.insert(index),
            None => return ReviewOutcome::InvalidIndex(id),
        };
    }

    for &index in &indices {
        let status = record.detected_fields[index].status;
        if status != FieldStatus::Pending {
            return ReviewOutcome::AlreadyReviewed { index, status };
        }
    }

    for &index in &indices {
        record.detected_fields[index].status = decision.status();
    }
    ReviewOutcome::Applied {
        record,
        updated_count: indices.len(),
    }
}

#[derive(sqlx::FromRow)]
struct DetectionRow {
    id: Uuid,
    template_id: Uuid,
    page_index: i32,
    detected_fields: Json<Vec<DetectedField>>,
    page_dimensions: Json<PageDimensions>,
    created_at: DateTime<Utc>,
}

impl From<DetectionRow> for DetectionRecord {
    fn from(row: DetectionRow) -> Self {
        Self {
            id: row.id,
            template_id: row.template_id,
            page_index: row.page_index,
            detected_fields: row.detected_fields.0,
            page_dimensions: row.page_dimensions.0,
            created_at: row.created_at,
        }
    }
}

const RETURNING: &str = "id, template_id, page_index, detected_fields, page_dimensions, created_at";

/// Postgres-backed store, one row per analyzed page in `form_detection`.
#[derive(Clone)]
pub struct PgDetectionStore {
    pool: PgPool,
}

impl PgDetectionStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DetectionStore for PgDetectionStore {
    async fn insert(&self, detection: CreateDetection) -> Result<DetectionRecord, DbError> {
        let row: DetectionRow = sqlx::query_as(&format!(
            r"
            INSERT INTO form_detection (id, template_id, page_index, detected_fields, page_dimensions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RETURNING}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(detection.template_id)
        .bind(detection.page_index)
        .bind(Json(&detection.detected_fields))
        .bind(Json(&detection.page_dimensions))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DetectionRecord>, DbError> {
        let row: Option<DetectionRow> = sqlx::query_as(&format!(
            "SELECT {RETURNING} FROM form_detection WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_by_template(&self, template_id: Uuid) -> Result<Vec<DetectionRecord>, DbError> {
        let rows: Vec<DetectionRow> = sqlx::query_as(&format!(
            r"
            SELECT {RETURNING} FROM form_detection
            WHERE template_id = $1
            ORDER BY created_at DESC, page_index
            "
        ))
        .bind(template_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn review_fields(
        &self,
        template_id: Uuid,
        id: Uuid,
        detection_ids: &[i64],
        decision: ReviewDecision,
    ) -> Result<ReviewOutcome, DbError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<DetectionRow> = sqlx::query_as(&format!(
            r"
            SELECT {RETURNING} FROM form_detection
            WHERE id = $1 AND template_id = $2
            FOR UPDATE
            "
        ))
        .bind(id)
        .bind(template_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(ReviewOutcome::NotFound);
        };

        let outcome = apply_review(row.into(), detection_ids, decision);
        if let ReviewOutcome::Applied {
            record,
            updated_count: 1..,
        } = &outcome
        {
            sqlx::query("UPDATE form_detection SET detected_fields = $2 WHERE id = $1")
                .bind(id)
                .bind(Json(&record.detected_fields))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(outcome)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM form_detection WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
