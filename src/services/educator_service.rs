use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use serde_json::{Map, Value};

use crate::{
    dto::forms::{EducatorApplication, EducatorApplyRequest},
    error::{AppError, AppResult},
    mail::{Attachment, educator_application_email},
    middleware::auth::AuthUser,
    models::Role,
    response::ApiResponse,
    services::auth_service::{current_user, user_path},
    state::AppState,
};

pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Decoded verification document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Accepts a `data:<mime>;base64,<payload>` URI or bare base64.
pub fn decode_document(raw: &str) -> AppResult<Document> {
    let raw = raw.trim();
    let (content_type, payload) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| AppError::BadRequest("malformed data URI".into()))?;
            let mime = header.split(';').next().unwrap_or_default();
            let mime = if mime.is_empty() {
                "application/octet-stream"
            } else {
                mime
            };
            (mime.to_string(), payload)
        }
        None => ("application/octet-stream".to_string(), raw),
    };

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|_| AppError::BadRequest("document is not valid base64".into()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("document is empty".into()));
    }
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(AppError::BadRequest("document exceeds 5 MB".into()));
    }
    Ok(Document {
        content_type,
        bytes,
    })
}

pub async fn apply(
    state: &AppState,
    user: &AuthUser,
    payload: EducatorApplyRequest,
) -> AppResult<ApiResponse<EducatorApplication>> {
    let applicant = current_user(state, user).await?;
    if matches!(applicant.role, Role::EducatorPending | Role::EducatorApproved) {
        return Err(AppError::BadRequest(format!(
            "an application already exists ({})",
            applicant.role
        )));
    }
    let doc_file = payload
        .doc_file
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("a verification document is required".into()))?;
    let document = decode_document(&doc_file)?;

    let application_date = Utc::now().to_rfc3339();
    let mut patch = Map::new();
    patch.insert("role".into(), Value::from(Role::EducatorPending.as_str()));
    patch.insert("verificationDocumentURL".into(), Value::String(doc_file));
    patch.insert(
        "applicationDate".into(),
        Value::String(application_date.clone()),
    );
    state.store.update(&user_path(&applicant.uid)?, patch).await?;
    tracing::info!(uid = %applicant.uid, "educator application received");

    let name = if payload.name.trim().is_empty() {
        applicant.username.as_str()
    } else {
        payload.name.as_str()
    };
    let email = if payload.email.trim().is_empty() {
        applicant.email.as_str()
    } else {
        payload.email.as_str()
    };
    let attachment = Attachment {
        filename: payload
            .doc_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "verification-document".to_string()),
        content_type: document.content_type,
        bytes: document.bytes,
    };
    let mail = educator_application_email(
        &state.config.contact_inbox,
        &applicant.uid,
        name,
        email,
        attachment,
    );
    if let Err(err) = state.mailer.send(mail).await {
        tracing::warn!(uid = %applicant.uid, error = %err, "educator application email failed");
    }

    Ok(ApiResponse::success(
        "Application submitted",
        EducatorApplication {
            status: Role::EducatorPending,
            application_date,
        },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_keeps_its_mime_type() {
        let doc = decode_document("data:application/pdf;base64,JVBERi0xLjQ=").unwrap();
        assert_eq!(doc.content_type, "application/pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn bare_base64_is_accepted() {
        let doc = decode_document("aGVsbG8=").unwrap();
        assert_eq!(doc.bytes, b"hello");
        assert_eq!(doc.content_type, "application/octet-stream");
    }

    #[test]
    fn invalid_or_oversized_documents_are_rejected() {
        assert!(decode_document("data:application/pdf;base64").is_err());
        assert!(decode_document("***").is_err());
        let big = BASE64.encode(vec![0u8; MAX_DOCUMENT_BYTES + 1]);
        assert!(matches!(decode_document(&big), Err(AppError::BadRequest(_))));
    }
}
