use std::path::Path;

use uuid::Uuid;

use crate::{
    dto::forms::UploadedFile,
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Lower-cased extension of the client's file name, if it looks sane.
fn extension(original_name: Option<&str>) -> Option<String> {
    let ext = Path::new(original_name?).extension()?.to_str()?;
    (ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| ext.to_ascii_lowercase())
}

/// Store an uploaded file under a fresh name and return its public URL.
pub async fn save_upload(
    state: &AppState,
    original_name: Option<&str>,
    bytes: &[u8],
) -> AppResult<ApiResponse<UploadedFile>> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("No file uploaded".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::BadRequest("File exceeds 5 MB".into()));
    }

    let name = match extension(original_name) {
        Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    };
    let dir = Path::new(&state.config.upload_dir);
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    tokio::fs::write(dir.join(&name), bytes)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    let url = format!("{}/uploads/{name}", state.config.public_base_url);
    tracing::info!(file = %name, size = bytes.len(), "file uploaded");
    Ok(ApiResponse::success("File uploaded", UploadedFile { url }, None))
}
