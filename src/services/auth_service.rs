use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
    store::{DocumentStore, StorePath, get_as, list_as, set_as},
};

const TOKEN_LIFETIME_HOURS: i64 = 24;

/// `credentials/{uid}`. Kept apart from the user record so profile reads
/// never carry the hash.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credential {
    email: String,
    password_hash: String,
}

pub fn user_path(uid: &str) -> AppResult<StorePath> {
    Ok(StorePath::root("users")?.child(uid)?)
}

/// Load a stored user record or fail with 404.
pub async fn fetch_user(store: &dyn DocumentStore, uid: &str) -> AppResult<User> {
    get_as::<User>(store, &user_path(uid)?)
        .await?
        .ok_or(AppError::NotFound)
}

/// The caller's stored record, which is authoritative for the role: the
/// token's copy may predate an educator application or approval.
pub async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<User> {
    fetch_user(state.store.as_ref(), &user.uid)
        .await
        .map_err(|err| match err {
            AppError::NotFound => AppError::Unauthorized,
            other => other,
        })
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        email,
        password,
        username,
    } = payload;
    let email = email.trim().to_lowercase();
    let username = username.trim().to_string();
    if email.is_empty() || password.is_empty() || username.is_empty() {
        return Err(AppError::BadRequest(
            "email, password and username are required".into(),
        ));
    }

    let store = state.store.as_ref();
    let credentials = list_as::<Credential>(store, &StorePath::root("credentials")?).await?;
    if credentials.iter().any(|(_, c)| c.email == email) {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let uid = Uuid::new_v4().to_string();
    let user = User {
        uid: uid.clone(),
        email: email.clone(),
        username,
        role: Role::Normal,
        followers: Default::default(),
        following: Default::default(),
        courses_enrolled: 0,
        description: None,
        photo_url: None,
        verification_document_url: None,
        application_date: None,
    };

    // A credential only ever exists next to a stored user record.
    let profile_path = user_path(&uid)?;
    set_as(store, &profile_path, &user).await?;
    let credential = Credential {
        email,
        password_hash,
    };
    let credential_path = StorePath::root("credentials")?.child(&uid)?;
    if let Err(err) = set_as(store, &credential_path, &credential).await {
        if let Err(cleanup) = store.remove(&profile_path).await {
            tracing::warn!(uid = %uid, error = %cleanup, "failed to roll back user record");
        }
        return Err(err.into());
    }

    tracing::info!(uid = %uid, "user registered");
    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();
    let store = state.store.as_ref();

    let credentials = list_as::<Credential>(store, &StorePath::root("credentials")?).await?;
    let Some((uid, credential)) = credentials.into_iter().find(|(_, c)| c.email == email) else {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    };

    let parsed_hash = PasswordHash::new(&credential.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let user = fetch_user(store, &uid).await?;
    let token = issue_token(&user.uid, user.role, &state.config.jwt_secret)?;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        user,
    };

    Ok(ApiResponse::success(
        "Logged in",
        resp,
        Some(Meta::empty()),
    ))
}

pub fn issue_token(uid: &str, role: Role, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_LIFETIME_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: uid.to_string(),
        role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let user = current_user(state, user).await?;
    Ok(ApiResponse::success("Ok", user, Some(Meta::empty())))
}
