use crate::{
    dto::forms::{Acknowledgement, ContactRequest},
    error::{AppError, AppResult},
    mail::{ContactMessage, contact_email},
    response::ApiResponse,
    state::AppState,
};

/// Forward a contact form to the team inbox. Unlike order and application
/// mail, a transport failure here fails the request.
pub async fn send_contact(
    state: &AppState,
    payload: ContactRequest,
) -> AppResult<ApiResponse<Acknowledgement>> {
    let ContactRequest {
        name,
        email,
        subject,
        category,
        message,
    } = payload;
    if name.trim().is_empty() || email.trim().is_empty() || message.trim().is_empty() {
        return Err(AppError::BadRequest(
            "name, email and message are required".into(),
        ));
    }

    let contact = ContactMessage {
        name,
        email,
        subject,
        category: if category.trim().is_empty() {
            "general".to_string()
        } else {
            category
        },
        message,
    };
    state
        .mailer
        .send(contact_email(&state.config.contact_inbox, &contact))
        .await?;

    tracing::info!(from = %contact.email, category = %contact.category, "contact message sent");
    Ok(ApiResponse::success(
        "Message sent",
        Acknowledgement { success: true },
        None,
    ))
}
