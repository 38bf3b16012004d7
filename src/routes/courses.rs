use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::{
    dto::{
        content::{BlockEditsRequest, EditedBlocks, RenderedDocument},
        courses::{
            CourseList, CourseQuery, CreateCourseRequest, EnrolledCoursesRequest,
            UpdateCourseRequest,
        },
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Course,
    response::ApiResponse,
    services::course_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/enrolled", post(enrolled_courses))
        .route(
            "/{id}",
            get(get_course).put(update_course).delete(archive_course),
        )
        .route("/{id}/blocks", patch(edit_blocks))
        .route("/{id}/render", get(render_course))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseQuery),
    responses(
        (status = 200, description = "List courses", body = ApiResponse<CourseList>)
    ),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> AppResult<Json<ApiResponse<CourseList>>> {
    let resp = course_service::list_courses(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Create course", body = ApiResponse<Course>),
        (status = 400, description = "Missing title or price"),
        (status = 403, description = "Not an approved educator")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Course>>)> {
    let resp = course_service::create_course(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(
        ("id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Get course", body = ApiResponse<Course>),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let resp = course_service::get_course(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(
        ("id" = String, Path, description = "Course ID")
    ),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Update course", body = ApiResponse<Course>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCourseRequest>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let resp = course_service::update_course(&state, &user, &id, payload).await?;
    Ok(Json(resp))
}

/// Courses are never hard-deleted; DELETE archives.
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(
        ("id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Archive course", body = ApiResponse<Course>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn archive_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let resp = course_service::archive_course(&state, &user, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/courses/enrolled",
    request_body = EnrolledCoursesRequest,
    responses(
        (status = 200, description = "Resolve enrolled course ids", body = ApiResponse<CourseList>)
    ),
    tag = "Courses"
)]
pub async fn enrolled_courses(
    State(state): State<AppState>,
    Json(payload): Json<EnrolledCoursesRequest>,
) -> AppResult<Json<ApiResponse<CourseList>>> {
    let resp = course_service::enrolled_courses(&state, payload.course_ids).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/courses/{id}/blocks",
    params(
        ("id" = String, Path, description = "Course ID")
    ),
    request_body = BlockEditsRequest,
    responses(
        (status = 200, description = "Apply block edits", body = ApiResponse<EditedBlocks>),
        (status = 403, description = "Not the author")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn edit_blocks(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<BlockEditsRequest>,
) -> AppResult<Json<ApiResponse<EditedBlocks>>> {
    let resp = course_service::edit_blocks(&state, &user, &id, payload.edits).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}/render",
    params(
        ("id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Sanitized course HTML", body = ApiResponse<RenderedDocument>),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
pub async fn render_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<RenderedDocument>>> {
    let resp = course_service::render_course(&state, &id).await?;
    Ok(Json(resp))
}
