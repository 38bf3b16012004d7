use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::post,
};

use crate::{
    dto::forms::{
        Acknowledgement, ContactRequest, EducatorApplication, EducatorApplyRequest, UploadForm,
        UploadedFile,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{contact_service, educator_service, upload_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact))
        .route("/educator-apply", post(educator_apply))
        .route("/upload", post(upload))
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message forwarded to the team", body = ApiResponse<Acknowledgement>),
        (status = 400, description = "Missing name, email or message"),
        (status = 500, description = "Mail transport failed")
    ),
    tag = "Forms"
)]
pub async fn contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<Json<ApiResponse<Acknowledgement>>> {
    let resp = contact_service::send_contact(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/educator-apply",
    request_body = EducatorApplyRequest,
    responses(
        (status = 200, description = "Application recorded", body = ApiResponse<EducatorApplication>),
        (status = 400, description = "Already applied or document missing")
    ),
    security(("bearer_auth" = [])),
    tag = "Forms"
)]
pub async fn educator_apply(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<EducatorApplyRequest>,
) -> AppResult<Json<ApiResponse<EducatorApplication>>> {
    let resp = educator_service::apply(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Public URL of the stored file", body = ApiResponse<UploadedFile>),
        (status = 400, description = "No file or file too large")
    ),
    tag = "Forms"
)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadedFile>>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let resp = upload_service::save_upload(&state, file_name.as_deref(), &bytes).await?;
        return Ok(Json(resp));
    }
    Err(AppError::BadRequest("No file uploaded".into()))
}
