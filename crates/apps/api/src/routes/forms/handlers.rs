use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use common_services::api::forms::error::FormsError;
use common_services::api::forms::interfaces::{
    DeleteDetectionResponse, ImportFormParams, ReviewDetectionsRequest, ReviewDetectionsResponse,
    UploadedImage,
};
use common_services::api::forms::service::{
    accept_detections, delete_detection, get_detection, import_form, list_detections,
    reject_detections,
};
use common_types::form_detection::DetectionRecord;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart body of a form import.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImportFormUpload {
    /// JPEG or PNG image of a single form page.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

fn multipart_error(err: &MultipartError, limit: usize) -> FormsError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        FormsError::PayloadTooLarge { limit }
    } else {
        FormsError::BadRequest(err.body_text())
    }
}

/// Pulls the `file` part out of the multipart body, ignoring any other parts.
async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<UploadedImage, FormsError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&e, limit))?;
        return Ok(UploadedImage {
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(FormsError::BadRequest(
        "Missing multipart field 'file'".to_string(),
    ))
}

/// Upload a form image and detect fillable fields.
///
/// Runs layout analysis on the image, classifies every recognized word and stores the
/// result as a new detection record with all fields pending review.
#[utoipa::path(
    post,
    path = "/forms/import/{template_id}",
    tag = "Forms",
    params(
        ("template_id" = Uuid, Path, description = "Template the page belongs to."),
        ImportFormParams
    ),
    request_body(content = ImportFormUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Detection record with the detected fields.", body = DetectionRecord),
        (status = 400, description = "Invalid page index, missing file or no page dimensions detected."),
        (status = 413, description = "Image file too large."),
        (status = 415, description = "Unsupported image type."),
        (status = 502, description = "The OCR service failed."),
        (status = 500, description = "OCR service not configured, or a database error occurred."),
    )
)]
#[instrument(skip(context, multipart))]
pub async fn import_form_handler(
    State(context): State<ApiContext>,
    Path(template_id): Path<Uuid>,
    Query(params): Query<ImportFormParams>,
    multipart: Multipart,
) -> Result<Json<DetectionRecord>, FormsError> {
    let detection_settings = &context.settings.detection;
    let upload = read_upload(multipart, detection_settings.max_upload_bytes).await?;
    let record = import_form(
        context.store.as_ref(),
        context.layout_analyzer.as_ref(),
        &context.classifier,
        detection_settings,
        template_id,
        params.page_index,
        upload,
    )
    .await?;
    Ok(Json(record))
}

/// List all detections for a template, newest first.
#[utoipa::path(
    get,
    path = "/forms/{template_id}/detections",
    tag = "Forms",
    params(
        ("template_id" = Uuid, Path, description = "Template ID.")
    ),
    responses(
        (status = 200, description = "Detection records of the template.", body = Vec<DetectionRecord>),
        (status = 500, description = "A database error occurred."),
    )
)]
pub async fn list_detections_handler(
    State(context): State<ApiContext>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<Vec<DetectionRecord>>, FormsError> {
    let records = list_detections(context.store.as_ref(), template_id).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/forms/{template_id}/detections/{detection_id}",
    tag = "Forms",
    params(
        ("template_id" = Uuid, Path, description = "Template ID."),
        ("detection_id" = Uuid, Path, description = "Detection record ID.")
    ),
    responses(
        (status = 200, description = "The detection record.", body = DetectionRecord),
        (status = 404, description = "Detection not found."),
        (status = 500, description = "A database error occurred."),
    )
)]
pub async fn get_detection_handler(
    State(context): State<ApiContext>,
    Path((template_id, detection_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DetectionRecord>, FormsError> {
    let record = get_detection(context.store.as_ref(), template_id, detection_id).await?;
    Ok(Json(record))
}

/// Accept detected fields.
///
/// `detectionIds` are positions in the record's `detectedFields`. Nothing changes unless
/// every index is valid and still pending.
#[utoipa::path(
    post,
    path = "/forms/{template_id}/detections/{detection_id}/accept",
    tag = "Forms",
    params(
        ("template_id" = Uuid, Path, description = "Template ID."),
        ("detection_id" = Uuid, Path, description = "Detection record ID.")
    ),
    request_body = ReviewDetectionsRequest,
    responses(
        (status = 200, description = "Fields accepted.", body = ReviewDetectionsResponse),
        (status = 400, description = "A detection index is out of range."),
        (status = 404, description = "Detection not found."),
        (status = 409, description = "A field was already reviewed."),
    )
)]
pub async fn accept_detections_handler(
    State(context): State<ApiContext>,
    Path((template_id, detection_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReviewDetectionsRequest>,
) -> Result<Json<ReviewDetectionsResponse>, FormsError> {
    let response = accept_detections(
        context.store.as_ref(),
        template_id,
        detection_id,
        &payload.detection_ids,
    )
    .await?;
    Ok(Json(response))
}

/// Reject detected fields.
#[utoipa::path(
    post,
    path = "/forms/{template_id}/detections/{detection_id}/reject",
    tag = "Forms",
    params(
        ("template_id" = Uuid, Path, description = "Template ID."),
        ("detection_id" = Uuid, Path, description = "Detection record ID.")
    ),
    request_body = ReviewDetectionsRequest,
    responses(
        (status = 200, description = "Fields rejected.", body = ReviewDetectionsResponse),
        (status = 400, description = "A detection index is out of range."),
        (status = 404, description = "Detection not found."),
        (status = 409, description = "A field was already reviewed."),
    )
)]
pub async fn reject_detections_handler(
    State(context): State<ApiContext>,
    Path((template_id, detection_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReviewDetectionsRequest>,
) -> Result<Json<ReviewDetectionsResponse>, FormsError> {
    let response = reject_detections(
        context.store.as_ref(),
        template_id,
        detection_id,
        &payload.detection_ids,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/forms/detections/{detection_id}",
    tag = "Forms",
    params(
        ("detection_id" = Uuid, Path, description = "Detection record ID.")
    ),
    responses(
        (status = 200, description = "Detection deleted.", body = DeleteDetectionResponse),
        (status = 404, description = "Detection not found."),
    )
)]
pub async fn delete_detection_handler(
    State(context): State<ApiContext>,
    Path(detection_id): Path<Uuid>,
) -> Result<Json<DeleteDetectionResponse>, FormsError> {
    delete_detection(context.store.as_ref(), detection_id).await?;
    Ok(Json(DeleteDetectionResponse {
        message: "Detection deleted successfully".to_string(),
    }))
}
