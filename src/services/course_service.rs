use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    domain::blocks::{BlockDocument, BlockEdit},
    dto::{
        content::{EditedBlocks, RenderedDocument},
        courses::{CourseList, CourseQuery, CreateCourseRequest, UpdateCourseRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner, ensure_role},
    models::{Course, Role},
    response::{ApiResponse, Meta},
    services::{auth_service::current_user, content_service},
    state::AppState,
    store::{DocumentStore, StoreError, StorePath, StorePathError, get_as, list_as, set_as},
};

fn course_path(id: &str) -> Result<StorePath, StorePathError> {
    StorePath::root("courses")?.child(id)
}

/// Every stored course, oldest first.
pub async fn all_courses(store: &dyn DocumentStore) -> Result<Vec<Course>, StoreError> {
    let mut courses: Vec<Course> = list_as::<Course>(store, &StorePath::root("courses")?)
        .await?
        .into_iter()
        .map(|(_, course)| course)
        .collect();
    courses.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(courses)
}

async fn fetch_course(store: &dyn DocumentStore, id: &str) -> AppResult<Course> {
    get_as::<Course>(store, &course_path(id)?)
        .await?
        .ok_or(AppError::NotFound)
}

/// Public catalog, or one author's courses including archived ones.
pub async fn list_courses(
    state: &AppState,
    query: CourseQuery,
) -> AppResult<ApiResponse<CourseList>> {
    let courses = all_courses(state.store.as_ref()).await?;
    let items: Vec<Course> = match query.author_id.as_deref().filter(|a| !a.is_empty()) {
        Some(author_id) => courses
            .into_iter()
            .filter(|c| c.author_id.as_deref() == Some(author_id))
            .collect(),
        None => courses.into_iter().filter(|c| !c.is_archived).collect(),
    };
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Ok", CourseList { items }, Some(meta)))
}

/// Archived courses stay reachable by id.
pub async fn get_course(state: &AppState, id: &str) -> AppResult<ApiResponse<Course>> {
    let course = fetch_course(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success("Ok", course, Some(Meta::empty())))
}

pub async fn create_course(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    let author = current_user(state, user).await?;
    ensure_role(author.role, Role::EducatorApproved)?;

    if payload.title.trim().is_empty() || payload.price.trim().is_empty() {
        return Err(AppError::BadRequest("title and price are required".into()));
    }

    let course = Course {
        id: Uuid::new_v4().to_string(),
        title: payload.title,
        description: payload.description,
        price: payload.price,
        duration: payload.duration,
        level: payload.level,
        image: payload.image,
        author_id: Some(author.uid),
        author_name: Some(author.username),
        created_at: Some(Utc::now().timestamp_millis()),
        html_content: payload.html_content,
        blocks: BlockDocument::from_blocks(payload.blocks).into_blocks(),
        is_archived: false,
    };
    set_as(state.store.as_ref(), &course_path(&course.id)?, &course).await?;

    tracing::info!(course_id = %course.id, "course created");
    Ok(ApiResponse::success("Course created", course, None))
}

pub async fn update_course(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    let store = state.store.as_ref();
    let mut course = fetch_course(store, id).await?;
    ensure_owner(user, course.author_id.as_deref())?;

    let UpdateCourseRequest {
        title,
        description,
        price,
        duration,
        level,
        image,
        html_content,
        blocks,
    } = payload;
    if let Some(title) = title {
        course.title = title;
    }
    if let Some(description) = description {
        course.description = description;
    }
    if let Some(price) = price {
        course.price = price;
    }
    if let Some(duration) = duration {
        course.duration = duration;
    }
    if let Some(level) = level {
        course.level = level;
    }
    if let Some(image) = image {
        course.image = image;
    }
    if html_content.is_some() {
        course.html_content = html_content;
    }
    if let Some(blocks) = blocks {
        course.blocks = BlockDocument::from_blocks(blocks).into_blocks();
    }

    set_as(store, &course_path(id)?, &course).await?;
    Ok(ApiResponse::success("Course updated", course, None))
}

/// Soft delete: the record stays, flagged as archived.
pub async fn archive_course(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<Course>> {
    let store = state.store.as_ref();
    let mut course = fetch_course(store, id).await?;
    ensure_owner(user, course.author_id.as_deref())?;

    let mut patch = Map::new();
    patch.insert("isArchived".into(), Value::Bool(true));
    store.update(&course_path(id)?, patch).await?;
    course.is_archived = true;

    tracing::info!(course_id = %id, "course archived");
    Ok(ApiResponse::success("Course archived", course, None))
}

/// Resolve enrolled course ids, silently skipping unknown ones.
pub async fn enrolled_courses(
    state: &AppState,
    course_ids: Vec<Value>,
) -> AppResult<ApiResponse<CourseList>> {
    let store = state.store.as_ref();
    let mut items = Vec::new();
    for raw in course_ids {
        let id = match raw {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        let Ok(path) = course_path(&id) else {
            continue;
        };
        if let Some(course) = get_as::<Course>(store, &path).await? {
            items.push(course);
        }
    }
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Ok", CourseList { items }, Some(meta)))
}

pub async fn edit_blocks(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    edits: Vec<BlockEdit>,
) -> AppResult<ApiResponse<EditedBlocks>> {
    let store = state.store.as_ref();
    let course = fetch_course(store, id).await?;
    ensure_owner(user, course.author_id.as_deref())?;

    let edited = content_service::apply_edits(course.blocks, edits);
    let blocks = serde_json::to_value(&edited.blocks)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    store.set(&course_path(id)?.child("blocks")?, blocks).await?;

    Ok(ApiResponse::success("Blocks updated", edited, None))
}

pub async fn render_course(state: &AppState, id: &str) -> AppResult<ApiResponse<RenderedDocument>> {
    let course = fetch_course(state.store.as_ref(), id).await?;
    let rendered = content_service::render(&course.blocks, course.html_content.as_deref());
    Ok(ApiResponse::success("Ok", rendered, None))
}
