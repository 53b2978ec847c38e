use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Location of a stored proposal PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Public path, e.g. `/uploads/pdfs/proposal-20250302141000-....pdf`
    pub url: String,
    pub filename: String,
}

/// Multipart form accepted by the PDF upload endpoint.
#[derive(Debug, ToSchema)]
pub struct UploadPdfForm {
    #[schema(value_type = String, format = Binary)]
    pub pdf: Vec<u8>,
}
