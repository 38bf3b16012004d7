use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};

use crate::{
    dto::{
        blogs::{BlogList, CreateBlogRequest, CreatedBlog, UpdateBlogRequest},
        content::{BlockEditsRequest, EditedBlocks, RenderedDocument},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::BlogPost,
    response::ApiResponse,
    services::blog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route("/{id}", get(get_blog).put(update_blog).delete(delete_blog))
        .route("/{id}/blocks", patch(edit_blocks))
        .route("/{id}/render", get(render_blog))
}

#[utoipa::path(
    get,
    path = "/api/blogs",
    responses(
        (status = 200, description = "List blog posts", body = ApiResponse<BlogList>)
    ),
    tag = "Blogs"
)]
pub async fn list_blogs(State(state): State<AppState>) -> AppResult<Json<ApiResponse<BlogList>>> {
    let resp = blog_service::list_blogs(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Publish a post and notify followers", body = ApiResponse<CreatedBlog>),
        (status = 400, description = "Missing title or content")
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn create_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBlogRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedBlog>>)> {
    let resp = blog_service::create_blog(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(
        ("id" = u64, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Get blog post", body = ApiResponse<BlogPost>),
        (status = 404, description = "Blog post not found")
    ),
    tag = "Blogs"
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = blog_service::get_blog(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(
        ("id" = u64, Path, description = "Blog ID")
    ),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Update blog post", body = ApiResponse<BlogPost>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Blog post not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn update_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateBlogRequest>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = blog_service::update_blog(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(
        ("id" = u64, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Delete blog post", body = ApiResponse<BlogPost>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Blog post not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn delete_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<u64>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = blog_service::delete_blog(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/blogs/{id}/blocks",
    params(
        ("id" = u64, Path, description = "Blog ID")
    ),
    request_body = BlockEditsRequest,
    responses(
        (status = 200, description = "Apply block edits", body = ApiResponse<EditedBlocks>),
        (status = 403, description = "Not the author")
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn edit_blocks(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<u64>,
    Json(payload): Json<BlockEditsRequest>,
) -> AppResult<Json<ApiResponse<EditedBlocks>>> {
    let resp = blog_service::edit_blocks(&state, &user, id, payload.edits).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{id}/render",
    params(
        ("id" = u64, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Sanitized post HTML", body = ApiResponse<RenderedDocument>),
        (status = 404, description = "Blog post not found")
    ),
    tag = "Blogs"
)]
pub async fn render_blog(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<ApiResponse<RenderedDocument>>> {
    let resp = blog_service::render_blog(&state, id).await?;
    Ok(Json(resp))
}
