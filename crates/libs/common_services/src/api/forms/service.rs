use crate::api::forms::error::FormsError;
use crate::api::forms::interfaces::{ReviewDetectionsResponse, UploadedImage};
use crate::database::{DetectionStore, ReviewOutcome};
use crate::ocr_client::LayoutAnalyzer;
use app_state::DetectionSettings;
use common_types::form_detection::{CreateDetection, DetectionRecord, ReviewDecision};
use form_detection::{FieldClassifier, detect_fields, detect_resolution};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

fn validate_page_index(page_index: Option<i64>) -> Result<i32, FormsError> {
    let page_index = page_index.unwrap_or(0);
    i32::try_from(page_index)
        .ok()
        .filter(|index| *index >= 0)
        .ok_or_else(|| FormsError::BadRequest(format!("Invalid page index: {page_index}")))
}

/// Checks type and size of an upload, returning the media type to forward to the OCR service.
fn validate_upload(
    settings: &DetectionSettings,
    upload: &UploadedImage,
) -> Result<String, FormsError> {
    let content_type = upload.content_type.as_deref().unwrap_or_default();
    if !settings.is_allowed_media_type(content_type) {
        let shown = if content_type.is_empty() {
            "unknown"
        } else {
            content_type
        };
        return Err(FormsError::UnsupportedMediaType(shown.to_string()));
    }
    if upload.bytes.len() > settings.max_upload_bytes {
        warn!("Rejecting upload of {} bytes", upload.bytes.len());
        return Err(FormsError::PayloadTooLarge {
            limit: settings.max_upload_bytes,
        });
    }
    if upload.bytes.is_empty() {
        return Err(FormsError::BadRequest("Uploaded file is empty".to_string()));
    }

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    Ok(if essence == "image/jpg" {
        "image/jpeg".to_string()
    } else {
        essence
    })
}

/// Runs layout analysis on an uploaded form image and stores the classified fields as a new
/// pending detection record for `template_id`.
#[instrument(skip(store, analyzer, classifier, settings, upload), fields(bytes = upload.bytes.len()))]
pub async fn import_form(
    store: &dyn DetectionStore,
    analyzer: &dyn LayoutAnalyzer,
    classifier: &Arc<FieldClassifier>,
    settings: &DetectionSettings,
    template_id: Uuid,
    page_index: Option<i64>,
    upload: UploadedImage,
) -> Result<DetectionRecord, FormsError> {
    let page_index = validate_page_index(page_index)?;
    let content_type = validate_upload(settings, &upload)?;
    info!(
        "Starting form import for template {}, page {}",
        template_id, page_index
    );

    let analysis = analyzer
        .analyze_layout(&upload.bytes, &content_type)
        .await?;

    let classifier = Arc::clone(classifier);
    let default_dpi = settings.default_dpi;
    let proximity_px = settings.proximity_px;
    let detection = tokio::task::spawn_blocking(move || {
        let dpi = detect_resolution(&upload.bytes, default_dpi);
        detect_fields(
            &classifier,
            &analysis.words,
            analysis.page_dimensions,
            dpi,
            proximity_px,
        )
    })
    .await??;

    let record = store
        .insert(CreateDetection {
            template_id,
            page_index,
            detected_fields: detection.fields,
            page_dimensions: detection.page_dimensions,
        })
        .await?;

    info!(
        "OCR complete: detected {} fields for template {}",
        record.detected_fields.len(),
        template_id
    );
    Ok(record)
}

/// All detection records of a template, newest first.
#[instrument(skip(store))]
pub async fn list_detections(
    store: &dyn DetectionStore,
    template_id: Uuid,
) -> Result<Vec<DetectionRecord>, FormsError> {
    Ok(store.list_by_template(template_id).await?)
}

/// Fetches a record, treating a record of another template as missing.
#[instrument(skip(store))]
pub async fn get_detection(
    store: &dyn DetectionStore,
    template_id: Uuid,
    detection_id: Uuid,
) -> Result<DetectionRecord, FormsError> {
    store
        .find_by_id(detection_id)
        .await?
        .filter(|record| record.template_id == template_id)
        .ok_or_else(|| FormsError::NotFound(detection_id.to_string()))
}

/// Moves the given fields of a record out of pending, as one atomic store operation.
#[instrument(skip(store))]
async fn review_detections(
    store: &dyn DetectionStore,
    template_id: Uuid,
    detection_id: Uuid,
    detection_ids: &[i64],
    decision: ReviewDecision,
) -> Result<ReviewDetectionsResponse, FormsError> {
    let (record, updated_count) = match store
        .review_fields(template_id, detection_id, detection_ids, decision)
        .await?
    {
        ReviewOutcome::Applied {
            record,
            updated_count,
        } => (record, updated_count),
        ReviewOutcome::NotFound => return Err(FormsError::NotFound(detection_id.to_string())),
        ReviewOutcome::InvalidIndex(id) => return Err(FormsError::InvalidFieldIndex(id)),
        ReviewOutcome::AlreadyReviewed { index, status } => {
            return Err(FormsError::AlreadyReviewed { index, status });
        }
    };

    let verb = match decision {
        ReviewDecision::Accept => "Accepted",
        ReviewDecision::Reject => "Rejected",
    };
    info!(
        "{} {} detections for template {}",
        verb, updated_count, template_id
    );
    Ok(ReviewDetectionsResponse {
        message: format!("{verb} {updated_count} detections"),
        updated_count,
        detection: record,
    })
}

/// Accepts pending fields. Nothing changes unless every index is valid and still pending;
/// repeated indices count once.
pub async fn accept_detections(
    store: &dyn DetectionStore,
    template_id: Uuid,
    detection_id: Uuid,
    detection_ids: &[i64],
) -> Result<ReviewDetectionsResponse, FormsError> {
    review_detections(
        store,
        template_id,
        detection_id,
        detection_ids,
        ReviewDecision::Accept,
    )
    .await
}

/// Rejects pending fields, with the same all-or-nothing validation as [`accept_detections`].
pub async fn reject_detections(
    store: &dyn DetectionStore,
    template_id: Uuid,
    detection_id: Uuid,
    detection_ids: &[i64],
) -> Result<ReviewDetectionsResponse, FormsError> {
    review_detections(
        store,
        template_id,
        detection_id,
        detection_ids,
        ReviewDecision::Reject,
    )
    .await
}

#[instrument(skip(store))]
pub async fn delete_detection(
    store: &dyn DetectionStore,
    detection_id: Uuid,
) -> Result<(), FormsError> {
    if !store.delete(detection_id).await? {
        return Err(FormsError::NotFound(detection_id.to_string()));
    }
    info!("Deleted detection {}", detection_id);
    Ok(())
}
