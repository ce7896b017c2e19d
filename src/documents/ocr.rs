use actix_web::{web, HttpResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::info;

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::responder::OcrRequest;
use crate::AppState;
use crate::Result;

/// Accepts raw base64 or a `data:<mime>;base64,` URL.
pub fn decode_image(image_base64: &str) -> Result<Vec<u8>> {
    let trimmed = image_base64.trim();
    let encoded = match trimmed.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => trimmed,
    };
    if encoded.is_empty() {
        return Err(AppError::validation("Image data is required"));
    }

    STANDARD
        .decode(encoded)
        .map_err(|_| AppError::validation("Image data is not valid base64"))
}

pub async fn extract_text(
    auth: AuthContext,
    req: web::Json<OcrRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let image = decode_image(&req.image_base64)?;
    info!(
        "OCR of {:?} ({} bytes) requested by {}",
        req.document_type,
        image.len(),
        auth.user_id
    );

    let response = state.responder.extract_document(&req).await?;
    Ok(HttpResponse::Ok().json(response))
}
