use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{dto::auth::Claims, error::AppError, models::Role, state::AppState};

/// Identity carried by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub role: Role,
}

pub fn ensure_role(role: Role, required: Role) -> Result<(), AppError> {
    if role != required {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// The caller must be the recorded author of the resource.
pub fn ensure_owner(user: &AuthUser, author_id: Option<&str>) -> Result<(), AppError> {
    match author_id {
        Some(author_id) if author_id == user.uid => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser {
        uid: decoded.claims.sub,
        role: decoded.claims.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::BadRequest("Invalid Authorization scheme".into()))?
            .trim();

        decode_token(token, &state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(uid: &str) -> AuthUser {
        AuthUser {
            uid: uid.into(),
            role: Role::Normal,
        }
    }

    #[test]
    fn owner_check_requires_matching_author() {
        assert!(ensure_owner(&user("u1"), Some("u1")).is_ok());
        assert!(matches!(
            ensure_owner(&user("u1"), Some("u2")),
            Err(AppError::Forbidden)
        ));
        assert!(ensure_owner(&user("u1"), None).is_err());
    }

    #[test]
    fn role_gate_is_exact() {
        assert!(ensure_role(Role::EducatorApproved, Role::EducatorApproved).is_ok());
        assert!(ensure_role(Role::EducatorPending, Role::EducatorApproved).is_err());
    }

    #[test]
    fn garbage_tokens_are_unauthorized() {
        assert!(matches!(
            decode_token("not-a-jwt", "secret"),
            Err(AppError::Unauthorized)
        ));
    }
}
