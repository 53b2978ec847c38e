use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use tracing::warn;

use super::common::created_response;
use crate::{
    auth::AuthRouterExt,
    errors::ServiceError,
    handlers::AppState,
    models::{UploadPdfForm, UploadResponse},
};

const PDF_FIELD: &str = "pdf";
/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

impl From<MultipartError> for ServiceError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServiceError::PayloadTooLarge(err.body_text())
        } else {
            ServiceError::BadRequest(err.body_text())
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/uploads/pdf",
    tag = "uploads",
    request_body(content = UploadPdfForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "PDF stored", body = UploadResponse),
        (status = 400, description = "Missing file or not a PDF", body = crate::errors::ErrorResponse),
        (status = 413, description = "File too large", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let uploads = &state.services.uploads;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }
        uploads.check_content_type(field.content_type())?;

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            data.extend_from_slice(&chunk);
            if let Err(e) = uploads.check_size(data.len()) {
                warn!(bytes = data.len(), "Rejected oversized upload");
                return Err(e);
            }
        }

        let stored = uploads.store_proposal_pdf(&data).await?;
        return Ok(created_response(stored));
    }

    Err(ServiceError::BadRequest("no file uploaded".to_string()))
}

pub fn upload_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/pdf", post(upload_pdf))
        .layer(DefaultBodyLimit::max(max_bytes.saturating_add(MULTIPART_OVERHEAD)))
        .with_auth()
}
