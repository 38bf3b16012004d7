use serde_json::{Map, Value};

use crate::{
    dto::users::FollowState,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{NotificationKind, PublicProfile},
    response::{ApiResponse, Meta},
    services::{
        auth_service::{current_user, fetch_user},
        notification_service::{notification, push},
    },
    state::AppState,
    store::StorePath,
};

pub async fn get_profile(state: &AppState, uid: &str) -> AppResult<ApiResponse<PublicProfile>> {
    let user = fetch_user(state.store.as_ref(), uid).await?;
    Ok(ApiResponse::success(
        "Ok",
        PublicProfile::from(&user),
        Some(Meta::empty()),
    ))
}

/// Both edges of a follow relation, as one patch on `users`.
fn follow_patch(follower: &str, followed: &str, value: Value) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert(format!("{follower}/following/{followed}"), value.clone());
    patch.insert(format!("{followed}/followers/{follower}"), value);
    patch
}

pub async fn follow(
    state: &AppState,
    user: &AuthUser,
    target_uid: &str,
) -> AppResult<ApiResponse<FollowState>> {
    if target_uid == user.uid {
        return Err(AppError::BadRequest("You cannot follow yourself".into()));
    }
    let me = current_user(state, user).await?;
    let store = state.store.as_ref();
    fetch_user(store, target_uid).await?;

    store
        .update(
            &StorePath::root("users")?,
            follow_patch(&me.uid, target_uid, Value::Bool(true)),
        )
        .await?;

    let note = notification(
        NotificationKind::NewFollower,
        format!("{} started following you.", me.username),
        Some(format!("/profile/{}", me.uid)),
        Some(me.uid.clone()),
    );
    if let Err(err) = push(store, target_uid, &note).await {
        tracing::warn!(follower = %me.uid, followed = %target_uid, error = %err, "follow notification failed");
    }

    Ok(ApiResponse::success(
        "Following",
        FollowState { following: true },
        None,
    ))
}

pub async fn unfollow(
    state: &AppState,
    user: &AuthUser,
    target_uid: &str,
) -> AppResult<ApiResponse<FollowState>> {
    if target_uid == user.uid {
        return Err(AppError::BadRequest("You cannot unfollow yourself".into()));
    }
    state
        .store
        .update(
            &StorePath::root("users")?,
            follow_patch(&user.uid, target_uid, Value::Null),
        )
        .await?;

    Ok(ApiResponse::success(
        "Unfollowed",
        FollowState { following: false },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_patch_writes_both_edges() {
        let patch = follow_patch("a", "b", Value::Bool(true));
        assert_eq!(patch.get("a/following/b"), Some(&Value::Bool(true)));
        assert_eq!(patch.get("b/followers/a"), Some(&Value::Bool(true)));
    }
}
