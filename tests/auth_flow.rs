mod common;

use baristaflow_api::{
    dto::auth::{LoginRequest, RegisterRequest},
    error::AppError,
    middleware::auth::decode_token,
    models::Role,
    mail::RecordingMailer,
    services::auth_service::{login_user, me, register_user},
    store::{DocumentStore, StorePath},
};
use common::{BrokenCollection, JWT_SECRET, app, app_with};

#[tokio::test]
async fn register_then_login_issues_a_token_for_the_stored_user() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;

    let created = register_user(
        state,
        RegisterRequest {
            email: "  Ana@Example.com ".to_string(),
            password: "secreto".to_string(),
            username: "Ana".to_string(),
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(created.email, "ana@example.com");
    assert_eq!(created.role, Role::Normal);
    assert!(created.followers.is_empty());

    let login = login_user(
        state,
        LoginRequest {
            email: "ana@example.com".to_string(),
            password: "secreto".to_string(),
        },
    )
    .await?
    .data
    .expect("login");
    let token = login.token.strip_prefix("Bearer ").expect("bearer prefix");
    let identity = decode_token(token, JWT_SECRET)?;
    assert_eq!(identity.uid, created.uid);

    let current = me(state, &identity).await?.data.expect("me");
    assert_eq!(current.username, "Ana");
    Ok(())
}

#[tokio::test]
async fn duplicate_email_and_bad_password_are_rejected() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let request = || RegisterRequest {
        email: "luis@example.com".to_string(),
        password: "pw".to_string(),
        username: "Luis".to_string(),
    };
    register_user(state, request()).await?;

    let again = register_user(state, request()).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    let wrong = login_user(
        state,
        LoginRequest {
            email: "luis@example.com".to_string(),
            password: "nope".to_string(),
        },
    )
    .await;
    assert!(matches!(wrong, Err(AppError::BadRequest(_))));

    let missing = register_user(
        state,
        RegisterRequest {
            email: String::new(),
            password: "pw".to_string(),
            username: "x".to_string(),
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_unauthorized() {
    let token = baristaflow_api::services::auth_service::issue_token("u1", Role::Normal, "other")
        .expect("token");
    assert!(matches!(
        decode_token(&token, JWT_SECRET),
        Err(AppError::Unauthorized)
    ));
}

fn ana() -> RegisterRequest {
    RegisterRequest {
        email: "ana@example.com".to_string(),
        password: "password123".to_string(),
        username: "Ana".to_string(),
    }
}

#[tokio::test]
async fn failed_registration_leaves_no_partial_account() -> anyhow::Result<()> {
    let store = std::sync::Arc::new(BrokenCollection::read_only("credentials"));
    let app = app_with(store.clone(), RecordingMailer::default());
    let failed = register_user(&app.state, ana()).await;
    assert!(matches!(failed, Err(AppError::Store(_))));
    assert!(store.inner().get(&StorePath::root("users")?).await?.is_none());

    let store = std::sync::Arc::new(BrokenCollection::read_only("users"));
    let app = app_with(store.clone(), RecordingMailer::default());
    let failed = register_user(&app.state, ana()).await;
    assert!(matches!(failed, Err(AppError::Store(_))));
    assert!(
        store
            .inner()
            .get(&StorePath::root("credentials")?)
            .await?
            .is_none()
    );
    Ok(())
}
