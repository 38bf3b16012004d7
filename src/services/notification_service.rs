use std::{convert::Infallible, sync::Arc};

use axum::response::sse::Event;
use chrono::Utc;
use futures_util::{Stream, stream};
use serde_json::{Map, Value, json};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::{
    dto::users::{NotificationList, UpdatedCount},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Notification, NotificationKind},
    response::{ApiResponse, Meta},
    state::AppState,
    store::{DocumentStore, StoreError, StorePath, StorePathError, list_as, set_as},
};

fn inbox_path(uid: &str) -> Result<StorePath, StorePathError> {
    StorePath::root("notifications")?.child(uid)
}

/// Unread notification built with the current timestamp.
pub fn notification(
    kind: NotificationKind,
    message: impl Into<String>,
    link: Option<String>,
    from_user_id: Option<String>,
) -> Notification {
    Notification {
        id: String::new(),
        kind,
        message: message.into(),
        link,
        from_user_id,
        read: false,
        timestamp: Utc::now().timestamp_millis(),
    }
}

/// Write `notification` into `uid`'s inbox under a fresh id.
pub async fn push(
    store: &dyn DocumentStore,
    uid: &str,
    notification: &Notification,
) -> Result<String, StoreError> {
    let id = Uuid::new_v4().to_string();
    let path = inbox_path(uid)?.child(&id)?;
    set_as(store, &path, notification).await?;
    Ok(id)
}

/// Inbox of `uid`, newest first.
pub async fn inbox(store: &dyn DocumentStore, uid: &str) -> Result<Vec<Notification>, StoreError> {
    let mut items: Vec<Notification> = list_as::<Notification>(store, &inbox_path(uid)?)
        .await?
        .into_iter()
        .map(|(id, mut n)| {
            n.id = id;
            n
        })
        .collect();
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
    Ok(items)
}

pub async fn unread_count(store: &dyn DocumentStore, uid: &str) -> Result<usize, StoreError> {
    Ok(inbox(store, uid).await?.iter().filter(|n| !n.read).count())
}

pub async fn list_notifications(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<NotificationList>> {
    let items = inbox(state.store.as_ref(), &user.uid).await?;
    let unread = items.iter().filter(|n| !n.read).count();
    let meta = Meta::total(items.len()).with_unread(unread);
    Ok(ApiResponse::success("Ok", NotificationList { items }, Some(meta)))
}

pub async fn mark_read(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<UpdatedCount>> {
    let path = inbox_path(&user.uid)?.child(id)?;
    if state.store.get(&path).await?.is_none() {
        return Err(AppError::NotFound);
    }
    let mut patch = Map::new();
    patch.insert("read".into(), Value::Bool(true));
    state.store.update(&path, patch).await?;
    Ok(ApiResponse::success("Marked as read", UpdatedCount { updated: 1 }, None))
}

pub async fn mark_all_read(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UpdatedCount>> {
    let store = state.store.as_ref();
    let unread: Map<String, Value> = inbox(store, &user.uid)
        .await?
        .into_iter()
        .filter(|n| !n.read)
        .map(|n| (format!("{}/read", n.id), Value::Bool(true)))
        .collect();
    let updated = unread.len();
    if updated > 0 {
        store.update(&inbox_path(&user.uid)?, unread).await?;
    }
    Ok(ApiResponse::success("Marked as read", UpdatedCount { updated }, None))
}

pub async fn clear_notifications(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UpdatedCount>> {
    let store = state.store.as_ref();
    let updated = inbox(store, &user.uid).await?.len();
    store.remove(&inbox_path(&user.uid)?).await?;
    Ok(ApiResponse::success("Notifications cleared", UpdatedCount { updated }, None))
}

struct Watch {
    store: Arc<dyn DocumentStore>,
    uid: String,
    inbox: StorePath,
    changes: broadcast::Receiver<StorePath>,
    primed: bool,
}

/// Server-sent events carrying the caller's unread count: once on connect,
/// then after every write that touches their inbox.
pub fn unread_stream(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<impl Stream<Item = Result<Event, Infallible>> + Send + use<>> {
    let watch = Watch {
        store: state.store.clone(),
        uid: user.uid.clone(),
        inbox: inbox_path(&user.uid)?,
        changes: state.store.subscribe(),
        primed: false,
    };

    Ok(stream::unfold(watch, |mut watch| async move {
        if watch.primed {
            loop {
                match watch.changes.recv().await {
                    Ok(path) if path.overlaps(&watch.inbox) => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "notification stream lagged");
                        break;
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        }
        watch.primed = true;

        let event = match unread_count(watch.store.as_ref(), &watch.uid).await {
            Ok(unread) => Event::default()
                .event("unread")
                .data(json!({ "unread": unread }).to_string()),
            Err(err) => {
                tracing::warn!(uid = %watch.uid, error = %err, "unread count failed");
                Event::default().event("error").data("unavailable")
            }
        };
        Some((Ok(event), watch))
    }))
}
