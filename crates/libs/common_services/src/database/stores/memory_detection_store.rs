use crate::database::{DbError, DetectionStore, ReviewOutcome, apply_review};
use async_trait::async_trait;
use chrono::Utc;
use common_types::form_detection::{CreateDetection, DetectionRecord, ReviewDecision};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store, used when no database is configured and in tests.
///
/// Records are kept in insertion order, which is also creation order.
#[derive(Default)]
pub struct MemoryDetectionStore {
    records: RwLock<Vec<DetectionRecord>>,
}

impl MemoryDetectionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DetectionStore for MemoryDetectionStore {
    async fn insert(&self, detection: CreateDetection) -> Result<DetectionRecord, DbError> {
        let record = DetectionRecord {
            id: Uuid::new_v4(),
            template_id: detection.template_id,
            page_index: detection.page_index,
            detected_fields: detection.detected_fields,
            page_dimensions: detection.page_dimensions,
            created_at: Utc::now(),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DetectionRecord>, DbError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_template(&self, template_id: Uuid) -> Result<Vec<DetectionRecord>, DbError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.template_id == template_id)
            .cloned()
            .collect())
    }

    async fn review_fields(
        &self,
        template_id: Uuid,
        id: Uuid,
        detection_ids: &[i64],
        decision: ReviewDecision,
    ) -> Result<ReviewOutcome, DbError> {
        let mut records = self.records.write().await;
        let Some(stored) = records
            .iter_mut()
            .find(|r| r.id == id && r.template_id == template_id)
        else {
            return Ok(ReviewOutcome::NotFound);
        };
        let outcome = apply_review(stored.clone(), detection_ids, decision);
        if let ReviewOutcome::Applied { record, .. } = &outcome {
            stored.clone_from(record);
        }
        Ok(outcome)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;
    use common_types::form_detection::{DetectedField, FieldStatus, FieldType};
    use common_types::{PageDimensions, PhysicalBBox};

    fn field() -> DetectedField {
        DetectedField {
            text: "Name".to_string(),
            bbox: PhysicalBBox::default(),
            confidence: 0.9,
            suggested_type: FieldType::Text,
            status: FieldStatus::Pending,
        }
    }

    fn detection(template_id: Uuid, page_index: i32) -> CreateDetection {
        CreateDetection {
            template_id,
            page_index,
            detected_fields: Vec::new(),
            page_dimensions: PageDimensions {
                width: 210.0,
                height: 297.0,
            },
        }
    }

    #[tokio::test]
    async fn lists_newest_first_per_template() -> Result<()> {
        let store = MemoryDetectionStore::new();
        let template = Uuid::new_v4();
        let first = store.insert(detection(template, 0)).await?;
        store.insert(detection(Uuid::new_v4(), 0)).await?;
        let second = store.insert(detection(template, 1)).await?;

        let listed: Vec<Uuid> = store
            .list_by_template(template)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, vec![second.id, first.id]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() -> Result<()> {
        let store = MemoryDetectionStore::new();
        let record = store.insert(detection(Uuid::new_v4(), 0)).await?;
        assert!(store.delete(record.id).await?);
        assert!(!store.delete(record.id).await?);
        assert!(store.find_by_id(record.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn review_of_other_template_is_not_found() -> Result<()> {
        let store = MemoryDetectionStore::new();
        let record = store.insert(detection(Uuid::new_v4(), 0)).await?;
        let outcome = store
            .review_fields(Uuid::new_v4(), record.id, &[], ReviewDecision::Accept)
            .await?;
        assert_eq!(outcome, ReviewOutcome::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_review_leaves_record_untouched() -> Result<()> {
        let store = MemoryDetectionStore::new();
        let template = Uuid::new_v4();
        let mut create = detection(template, 0);
        create.detected_fields = vec![field(), field()];
        let record = store.insert(create).await?;

        let outcome = store
            .review_fields(template, record.id, &[0, 2], ReviewDecision::Reject)
            .await?;
        assert_eq!(outcome, ReviewOutcome::InvalidIndex(2));
        assert_eq!(store.find_by_id(record.id).await?, Some(record.clone()));

        let outcome = store
            .review_fields(template, record.id, &[1], ReviewDecision::Reject)
            .await?;
        let ReviewOutcome::Applied {
            record: reviewed,
            updated_count,
        } = outcome
        else {
            panic!("review should apply, got {outcome:?}");
        };
        assert_eq!(updated_count, 1);
        assert_eq!(reviewed.detected_fields[1].status, FieldStatus::Rejected);
        assert_eq!(store.find_by_id(record.id).await?, Some(reviewed));
        Ok(())
    }
}
