use chrono::Utc;
use futures_util::future::join_all;
use serde_json::Value;

use crate::{
    domain::blocks::{BlockDocument, BlockEdit},
    dto::{
        blogs::{BlogList, CreateBlogRequest, CreatedBlog, UpdateBlogRequest},
        content::{EditedBlocks, RenderedDocument},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::{BlogPost, NotificationKind, User},
    response::{ApiResponse, Meta},
    services::{
        auth_service::current_user,
        content_service,
        notification_service::{notification, push},
    },
    state::AppState,
    store::{DocumentStore, StoreError, StorePath, StorePathError, get_as, list_as, set_as},
};

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/800x400";
const EXCERPT_CHARS: usize = 100;

fn blog_path(id: u64) -> Result<StorePath, StorePathError> {
    StorePath::root("blogs")?.child(id)
}

/// Every stored post, ordered by id.
pub async fn all_blogs(store: &dyn DocumentStore) -> Result<Vec<BlogPost>, StoreError> {
    let mut blogs: Vec<BlogPost> = list_as::<BlogPost>(store, &StorePath::root("blogs")?)
        .await?
        .into_iter()
        .map(|(_, blog)| blog)
        .collect();
    blogs.sort_by_key(|b| b.id);
    Ok(blogs)
}

async fn fetch_blog(store: &dyn DocumentStore, id: u64) -> AppResult<BlogPost> {
    get_as::<BlogPost>(store, &blog_path(id)?)
        .await?
        .ok_or(AppError::NotFound)
}

/// First 100 characters followed by an ellipsis.
pub fn default_excerpt(content: &str) -> String {
    let head: String = content.chars().take(EXCERPT_CHARS).collect();
    format!("{head}...")
}

/// Next id: one past the largest id found under `blogs`. Two concurrent
/// creators can pick the same id; the later write wins.
async fn next_blog_id(store: &dyn DocumentStore) -> Result<u64, StoreError> {
    let Some(Value::Object(blogs)) = store.get(&StorePath::root("blogs")?).await? else {
        return Ok(1);
    };
    let max = blogs
        .iter()
        .filter_map(|(key, value)| {
            value
                .get("id")
                .and_then(Value::as_u64)
                .or_else(|| key.parse().ok())
        })
        .max()
        .unwrap_or(0);
    Ok(max + 1)
}

pub async fn list_blogs(state: &AppState) -> AppResult<ApiResponse<BlogList>> {
    let items = all_blogs(state.store.as_ref()).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Ok", BlogList { items }, Some(meta)))
}

pub async fn get_blog(state: &AppState, id: u64) -> AppResult<ApiResponse<BlogPost>> {
    let blog = fetch_blog(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success("Ok", blog, Some(Meta::empty())))
}

pub async fn create_blog(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBlogRequest,
) -> AppResult<ApiResponse<CreatedBlog>> {
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(AppError::BadRequest("title and content are required".into()));
    }
    let author = current_user(state, user).await?;
    let store = state.store.as_ref();

    let id = next_blog_id(store).await?;
    let blog = BlogPost {
        id,
        excerpt: payload
            .excerpt
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| default_excerpt(&payload.content)),
        title: payload.title,
        content: payload.content,
        image_url: payload
            .image_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        author: author.username.clone(),
        author_id: Some(author.uid.clone()),
        date: payload
            .date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
        likes: 0,
        comments: 0,
        html_content: payload.html_content,
        blocks: BlockDocument::from_blocks(payload.blocks).into_blocks(),
    };
    set_as(store, &blog_path(id)?, &blog).await?;
    tracing::info!(blog_id = id, title = %blog.title, "blog created");

    let notified_followers = notify_followers(store, &author, &blog).await;
    Ok(ApiResponse::success(
        "Blog created",
        CreatedBlog {
            blog,
            notified_followers,
        },
        None,
    ))
}

/// One `new_post` notification per follower, written concurrently. Failures
/// are logged; the post is already stored.
async fn notify_followers(store: &dyn DocumentStore, author: &User, blog: &BlogPost) -> usize {
    let note = notification(
        NotificationKind::NewPost,
        format!("{} published a new post: \"{}\".", author.username, blog.title),
        Some(format!("/community/{}", blog.id)),
        Some(author.uid.clone()),
    );
    let followers: Vec<&String> = author
        .followers
        .iter()
        .filter(|(_, following)| **following)
        .map(|(uid, _)| uid)
        .collect();

    let results = join_all(followers.iter().map(|uid| push(store, uid, &note))).await;
    let mut delivered = 0;
    for (uid, result) in followers.iter().zip(results) {
        match result {
            Ok(_) => delivered += 1,
            Err(err) => {
                tracing::warn!(follower = %uid, blog_id = blog.id, error = %err, "follower notification failed");
            }
        }
    }
    tracing::debug!(delivered, total = followers.len(), "followers notified");
    delivered
}

pub async fn update_blog(
    state: &AppState,
    user: &AuthUser,
    id: u64,
    payload: UpdateBlogRequest,
) -> AppResult<ApiResponse<BlogPost>> {
    let store = state.store.as_ref();
    let mut blog = fetch_blog(store, id).await?;
    ensure_owner(user, blog.author_id.as_deref())?;

    let UpdateBlogRequest {
        title,
        content,
        image_url,
        excerpt,
        date,
        html_content,
        blocks,
    } = payload;
    if let Some(title) = title {
        blog.title = title;
    }
    if let Some(content) = content {
        blog.content = content;
    }
    if let Some(image_url) = image_url {
        blog.image_url = image_url;
    }
    if let Some(excerpt) = excerpt {
        blog.excerpt = excerpt;
    }
    if let Some(date) = date {
        blog.date = date;
    }
    if html_content.is_some() {
        blog.html_content = html_content;
    }
    if let Some(blocks) = blocks {
        blog.blocks = BlockDocument::from_blocks(blocks).into_blocks();
    }

    set_as(store, &blog_path(id)?, &blog).await?;
    Ok(ApiResponse::success("Blog updated", blog, None))
}

/// Permanent removal.
pub async fn delete_blog(
    state: &AppState,
    user: &AuthUser,
    id: u64,
) -> AppResult<ApiResponse<BlogPost>> {
    let store = state.store.as_ref();
    let blog = fetch_blog(store, id).await?;
    ensure_owner(user, blog.author_id.as_deref())?;

    store.remove(&blog_path(id)?).await?;
    tracing::info!(blog_id = id, "blog deleted");
    Ok(ApiResponse::success("Blog deleted", blog, None))
}

pub async fn edit_blocks(
    state: &AppState,
    user: &AuthUser,
    id: u64,
    edits: Vec<BlockEdit>,
) -> AppResult<ApiResponse<EditedBlocks>> {
    let store = state.store.as_ref();
    let blog = fetch_blog(store, id).await?;
    ensure_owner(user, blog.author_id.as_deref())?;

    let edited = content_service::apply_edits(blog.blocks, edits);
    let blocks = serde_json::to_value(&edited.blocks)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    store.set(&blog_path(id)?.child("blocks")?, blocks).await?;

    Ok(ApiResponse::success("Blocks updated", edited, None))
}

pub async fn render_blog(state: &AppState, id: u64) -> AppResult<ApiResponse<RenderedDocument>> {
    let blog = fetch_blog(state.store.as_ref(), id).await?;
    let rendered = content_service::render(&blog.blocks, blog.html_content.as_deref());
    Ok(ApiResponse::success("Ok", rendered, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let content = "é".repeat(150);
        let excerpt = default_excerpt(&content);
        assert_eq!(excerpt.chars().count(), 103);
        assert!(excerpt.ends_with("..."));
        assert_eq!(default_excerpt("corto"), "corto...");
    }
}
