mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use baristaflow_api::{
    config::DEFAULT_BODY_LIMIT,
    routes::{create_api_router, with_body_limit},
    services::auth_service::issue_token,
    state::AppState,
};
use common::{JWT_SECRET, app, register};
use serde_json::json;
use tower::ServiceExt;

const MIB: usize = 1024 * 1024;
const BOUNDARY: &str = "baristaflow-boundary";

fn api(state: AppState) -> Router {
    with_body_limit(Router::new().nest("/api", create_api_router()), DEFAULT_BODY_LIMIT)
        .with_state(state)
}

fn upload_request(size: usize) -> anyhow::Result<Request<Body>> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"foto.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend(std::iter::repeat_n(b'x', size));
    body.extend(format!("\r\n--{BOUNDARY}--\r\n").into_bytes());

    Ok(Request::post("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))?)
}

fn state_with_upload_dir(state: &AppState, dir: &std::path::Path) -> AppState {
    let mut config = (*state.config).clone();
    config.upload_dir = dir.to_string_lossy().into_owned();
    AppState::new(state.store.clone(), state.mailer.clone(), config)
}

#[tokio::test]
async fn uploads_above_two_megabytes_reach_the_handler() -> anyhow::Result<()> {
    let app = app();
    let dir = std::env::temp_dir().join(format!("baristaflow-limit-{}", uuid::Uuid::new_v4()));
    let router = api(state_with_upload_dir(&app.state, &dir));

    let accepted = router.clone().oneshot(upload_request(3 * MIB)?).await?;
    assert_eq!(accepted.status(), StatusCode::OK);

    let too_large_for_uploads = router.clone().oneshot(upload_request(6 * MIB)?).await?;
    assert_eq!(too_large_for_uploads.status(), StatusCode::BAD_REQUEST);

    let over_limit = router.oneshot(upload_request(DEFAULT_BODY_LIMIT + MIB)?).await?;
    assert_eq!(over_limit.status(), StatusCode::PAYLOAD_TOO_LARGE);

    tokio::fs::remove_dir_all(&dir).await?;
    Ok(())
}

#[tokio::test]
async fn educator_documents_above_two_megabytes_are_accepted() -> anyhow::Result<()> {
    let app = app();
    let ana = register(&app.state, "Ana").await?;
    let token = issue_token(&ana.uid, ana.role, JWT_SECRET)?;

    let document = format!(
        "data:application/pdf;base64,{}",
        BASE64.encode(vec![b'%'; 3 * MIB])
    );
    let body = serde_json::to_vec(&json!({
        "name": "Ana Rojas",
        "email": "ana@example.com",
        "docFile": document,
        "docName": "certificado.pdf"
    }))?;
    let request = Request::post("/api/educator-apply")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))?;

    let response = api(app.state.clone()).oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.mailer.sent().len(), 1);
    Ok(())
}
