//! Outbound email: the transport port, its SMTP and log-only adapters, and
//! the message templates the API sends.

use std::sync::Mutex;

use ammonia::clean_text;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{
        Attachment as MailAttachment, Mailbox, MultiPart, SinglePart, header::ContentType,
    },
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::models::{CustomerFields, Order};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address {0:?}")]
    Address(String),

    #[error("could not build message: {0}")]
    Build(String),

    #[error("mail transport failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// SMTP relay. Port 465 uses implicit TLS, anything else STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        from: &str,
    ) -> Result<Self, MailError> {
        let relay = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        };
        let builder = relay
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(port);

        let builder = match (username, password) {
            (Some(user), Some(pass)) => builder.credentials(Credentials::new(user, pass)),
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from: mailbox(from)?,
        })
    }

    fn build_message(&self, email: Email) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(mailbox(&email.to)?)
            .subject(email.subject);
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(mailbox(reply_to)?);
        }

        let body = match email.html {
            Some(html) => MultiPart::alternative_plain_html(email.text, html),
            None => MultiPart::mixed().singlepart(SinglePart::plain(email.text)),
        };

        let message = if email.attachments.is_empty() {
            builder.multipart(body)
        } else {
            let mut mixed = MultiPart::mixed().multipart(body);
            for attachment in email.attachments {
                let content_type = ContentType::parse(&attachment.content_type)
                    .or_else(|_| ContentType::parse("application/octet-stream"))
                    .map_err(|e| MailError::Build(e.to_string()))?;
                mixed = mixed.singlepart(
                    MailAttachment::new(attachment.filename).body(attachment.bytes, content_type),
                );
            }
            builder.multipart(mixed)
        };

        message.map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let to = email.to.clone();
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        tracing::info!(to = %to, "mail sent");
        Ok(())
    }
}

/// Used when no SMTP host is configured: logs the message and succeeds.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            attachments = email.attachments.len(),
            "mail transport not configured, message logged only"
        );
        Ok(())
    }
}

/// Keeps every message in memory. Can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("recording mailer set to fail".into()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse()
        .map_err(|_| MailError::Address(address.to_string()))
}

fn paragraphs(text: &str) -> String {
    text.lines()
        .map(clean_text)
        .collect::<Vec<_>>()
        .join("<br>")
}

#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub category: String,
    pub message: String,
}

pub fn contact_email(inbox: &str, contact: &ContactMessage) -> Email {
    let ContactMessage {
        name,
        email,
        subject,
        category,
        message,
    } = contact;
    Email {
        to: inbox.to_string(),
        reply_to: Some(email.clone()),
        subject: format!("[{category}] New message from {name}: {subject}"),
        text: format!(
            "You have received a new message from the BaristaFlow contact form.\n\n\
             Sender details\n\
             --------------\n\
             Name: {name}\n\
             Email: {email}\n\
             Category: {category}\n\
             Subject: {subject}\n\n\
             Message\n\
             -------\n\
             {message}\n"
        ),
        html: Some(format!(
            "<h3>New contact message - BaristaFlow</h3>\
             <p><strong>Name:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p><strong>Category:</strong> {}</p>\
             <p><strong>Subject:</strong> {}</p>\
             <hr><p><strong>Message:</strong></p><p>{}</p>",
            clean_text(name),
            clean_text(email),
            clean_text(category),
            clean_text(subject),
            paragraphs(message)
        )),
        attachments: Vec::new(),
    }
}

pub fn order_confirmation_email(to: &str, order: &Order) -> Email {
    let CustomerFields {
        full_name,
        address,
        city,
        region,
        ..
    } = &order.customer;

    let mut text = format!(
        "Hi {full_name},\n\nThank you for your purchase. Order {} is {}.\n\n",
        order.id, order.status
    );
    let mut rows = String::new();
    for item in &order.items {
        text.push_str(&format!(
            "- {} x{}: ${:.2}\n",
            item.name,
            item.quantity,
            item.line_total()
        ));
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>${:.2}</td></tr>",
            clean_text(&item.name),
            item.quantity,
            item.line_total()
        ));
    }
    text.push_str(&format!(
        "\nTotal: ${:.2}\nPayment method: {}\nShipping to: {address}, {city}, {region}\n",
        order.total, order.payment_method
    ));

    let html = format!(
        "<h2>Thank you for your purchase, {}</h2>\
         <p>Order <strong>{}</strong> is {}.</p>\
         <table><thead><tr><th>Product</th><th>Qty</th><th>Subtotal</th></tr></thead><tbody>{rows}</tbody></table>\
         <p><strong>Total:</strong> ${:.2}</p>\
         <p>Payment method: {}</p>\
         <p>Shipping to: {}, {}, {}</p>",
        clean_text(full_name),
        clean_text(&order.id),
        clean_text(&order.status),
        order.total,
        clean_text(&order.payment_method),
        clean_text(address),
        clean_text(city),
        clean_text(region)
    );

    Email {
        to: to.to_string(),
        reply_to: None,
        subject: format!("BaristaFlow order {} confirmed", order.id),
        text,
        html: Some(html),
        attachments: Vec::new(),
    }
}

pub fn educator_application_email(
    inbox: &str,
    uid: &str,
    name: &str,
    email: &str,
    document: Attachment,
) -> Email {
    Email {
        to: inbox.to_string(),
        reply_to: Some(email.to_string()),
        subject: format!("New educator application from {name}"),
        text: format!(
            "{name} ({email}) applied to become an educator.\n\
             User id: {uid}\n\
             The verification document is attached ({}).\n",
            document.filename
        ),
        html: Some(format!(
            "<h3>New educator application</h3>\
             <p><strong>Name:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p><strong>User id:</strong> {}</p>\
             <p>The verification document is attached.</p>",
            clean_text(name),
            clean_text(email),
            clean_text(uid)
        )),
        attachments: vec![document],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::{CartItem, ItemId, Price};

    #[test]
    fn contact_subject_carries_category_and_sender() {
        let email = contact_email(
            "inbox@example.com",
            &ContactMessage {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                subject: "Pedido".into(),
                category: "soporte".into(),
                message: "Hola\n<b>gracias</b>".into(),
            },
        );
        assert_eq!(email.subject, "[soporte] New message from Ana: Pedido");
        assert_eq!(email.to, "inbox@example.com");
        assert_eq!(email.reply_to.as_deref(), Some("ana@example.com"));
        let html = email.html.unwrap();
        assert!(html.contains("<br>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn order_email_lists_every_line() {
        let order = Order {
            id: "ORD-1".into(),
            customer: CustomerFields {
                full_name: "Ana".into(),
                ..CustomerFields::default()
            },
            items: vec![CartItem {
                id: ItemId::Number(101),
                name: "Café de Especialidad".into(),
                unit_price: Price::Text("$25.99".into()),
                image: String::new(),
                quantity: 2,
            }],
            total: 51.98,
            status: "Completado".into(),
            date: "2026-01-01".into(),
            payment_method: "Mercado Pago".into(),
        };
        let email = order_confirmation_email("ana@example.com", &order);
        assert!(email.text.contains("x2: $51.98"));
        assert!(email.text.contains("Total: $51.98"));
        assert!(email.subject.contains("ORD-1"));
    }

    #[tokio::test]
    async fn recording_mailer_keeps_messages() {
        let mailer = RecordingMailer::default();
        let email = contact_email(
            "inbox@example.com",
            &ContactMessage {
                name: "A".into(),
                email: "a@example.com".into(),
                subject: String::new(),
                category: "general".into(),
                message: "m".into(),
            },
        );
        mailer.send(email).await.unwrap();
        assert_eq!(mailer.sent().len(), 1);
        assert!(RecordingMailer::failing().send(mailer.sent()[0].clone()).await.is_err());
    }
}
