mod common;

use std::time::Duration;

use baristaflow_api::{
    error::AppError,
    models::NotificationKind,
    services::{
        auth_service::fetch_user,
        notification_service::{self, notification, push},
        user_service,
    },
};
use common::{app, register};
use futures_util::StreamExt;

#[tokio::test]
async fn follow_writes_both_edges_and_notifies() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let fan = register(state, "Benja").await?;
    let star = register(state, "Andrea").await?;

    user_service::follow(state, &fan, &star.uid).await?;

    let fan_record = fetch_user(state.store.as_ref(), &fan.uid).await?;
    let star_record = fetch_user(state.store.as_ref(), &star.uid).await?;
    assert_eq!(fan_record.following.get(&star.uid), Some(&true));
    assert_eq!(star_record.followers.get(&fan.uid), Some(&true));

    let profile = user_service::get_profile(state, &star.uid)
        .await?
        .data
        .expect("profile");
    assert_eq!(profile.followers, 1);

    let inbox = notification_service::inbox(state.store.as_ref(), &star.uid).await?;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::NewFollower);
    assert_eq!(inbox[0].from_user_id.as_deref(), Some(fan.uid.as_str()));

    user_service::unfollow(state, &fan, &star.uid).await?;
    let star_record = fetch_user(state.store.as_ref(), &star.uid).await?;
    assert!(star_record.followers.is_empty());
    let fan_record = fetch_user(state.store.as_ref(), &fan.uid).await?;
    assert!(fan_record.following.is_empty());
    Ok(())
}

#[tokio::test]
async fn following_yourself_or_a_stranger_fails() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let me = register(state, "Benja").await?;

    let own = user_service::follow(state, &me, &me.uid).await;
    assert!(matches!(own, Err(AppError::BadRequest(_))));

    let ghost = user_service::follow(state, &me, "ghost").await;
    assert!(matches!(ghost, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn notifications_can_be_read_and_cleared() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let user = register(state, "Ana").await?;
    let store = state.store.as_ref();

    let first = push(
        store,
        &user.uid,
        &notification(NotificationKind::System, "Bienvenida", None, None),
    )
    .await?;
    push(
        store,
        &user.uid,
        &notification(NotificationKind::System, "Nuevo curso", None, None),
    )
    .await?;

    let listed = notification_service::list_notifications(state, &user).await?;
    assert_eq!(listed.meta.as_ref().and_then(|m| m.unread), Some(2));

    notification_service::mark_read(state, &user, &first).await?;
    assert_eq!(notification_service::unread_count(store, &user.uid).await?, 1);

    let missing = notification_service::mark_read(state, &user, "nope").await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let all = notification_service::mark_all_read(state, &user)
        .await?
        .data
        .expect("count");
    assert_eq!(all.updated, 1);
    assert_eq!(notification_service::unread_count(store, &user.uid).await?, 0);

    let cleared = notification_service::clear_notifications(state, &user)
        .await?
        .data
        .expect("count");
    assert_eq!(cleared.updated, 2);
    assert!(notification_service::inbox(store, &user.uid).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unread_stream_emits_on_connect_and_on_new_notifications() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let user = register(state, "Ana").await?;
    let other = register(state, "Luis").await?;

    let mut stream = Box::pin(notification_service::unread_stream(state, &user)?);
    let first = tokio::time::timeout(Duration::from_secs(1), stream.next()).await?;
    assert!(first.is_some());

    // Writes to someone else's inbox do not wake the stream.
    push(
        state.store.as_ref(),
        &other.uid,
        &notification(NotificationKind::System, "otro", None, None),
    )
    .await?;
    assert!(
        tokio::time::timeout(Duration::from_millis(100), stream.next())
            .await
            .is_err()
    );

    push(
        state.store.as_ref(),
        &user.uid,
        &notification(NotificationKind::System, "hola", None, None),
    )
    .await?;
    let update = tokio::time::timeout(Duration::from_secs(1), stream.next()).await?;
    assert!(update.is_some());
    Ok(())
}
