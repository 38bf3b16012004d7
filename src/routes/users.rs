use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::users::FollowState,
    error::AppResult,
    middleware::auth::AuthUser,
    models::PublicProfile,
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{uid}", get(get_profile))
        .route("/{uid}/follow", post(follow).delete(unfollow))
}

#[utoipa::path(
    get,
    path = "/api/users/{uid}",
    params(
        ("uid" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Public profile", body = ApiResponse<PublicProfile>),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let resp = user_service::get_profile(&state, &uid).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/users/{uid}/follow",
    params(
        ("uid" = String, Path, description = "User to follow")
    ),
    responses(
        (status = 200, description = "Follow user", body = ApiResponse<FollowState>),
        (status = 400, description = "Cannot follow yourself"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn follow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<FollowState>>> {
    let resp = user_service::follow(&state, &user, &uid).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/users/{uid}/follow",
    params(
        ("uid" = String, Path, description = "User to unfollow")
    ),
    responses(
        (status = 200, description = "Unfollow user", body = ApiResponse<FollowState>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn unfollow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<FollowState>>> {
    let resp = user_service::unfollow(&state, &user, &uid).await?;
    Ok(Json(resp))
}
