use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, bail};

pub const DEFAULT_CONTACT_INBOX: &str = "baristaflow.cl@gmail.com";
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Postgres => "postgres",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => bail!("unknown STORE_BACKEND {other:?}, expected memory or postgres"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub smtp: Option<SmtpConfig>,
    pub mail_from: String,
    pub contact_inbox: String,
    pub cors_origins: Vec<String>,
    pub upload_dir: String,
    pub public_base_url: String,
    pub body_limit: usize,
    pub payment_latency: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_backend = env::var("STORE_BACKEND")
            .map(|v| v.parse())
            .unwrap_or(Ok(StoreBackend::Memory))?;
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL is required when STORE_BACKEND=postgres");
        }
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;

        let username = env::var("SMTP_USERNAME").or_else(|_| env::var("EMAIL_USER")).ok();
        let password = env::var("SMTP_PASSWORD").or_else(|_| env::var("EMAIL_PASS")).ok();
        let smtp = env::var("SMTP_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .map(|host| SmtpConfig {
                host,
                port: parsed("SMTP_PORT", 587),
                username: username.clone(),
                password,
            });
        let mail_from = env::var("MAIL_FROM")
            .ok()
            .or(username)
            .unwrap_or_else(|| "BaristaFlow <no-reply@baristaflow.cl>".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:5174".to_string())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            host: env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("APP_PORT", 3000),
            store_backend,
            database_url,
            jwt_secret,
            smtp,
            mail_from,
            contact_inbox: env::var("CONTACT_INBOX")
                .unwrap_or_else(|_| DEFAULT_CONTACT_INBOX.to_string()),
            cors_origins,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            body_limit: parsed("BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT),
            payment_latency: Duration::from_millis(parsed("PAYMENT_LATENCY_MS", 2000)),
        })
    }

    /// Configuration for tests and tools that never touch the network.
    pub fn local(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt_secret: jwt_secret.into(),
            smtp: None,
            mail_from: "BaristaFlow <no-reply@baristaflow.cl>".to_string(),
            contact_inbox: DEFAULT_CONTACT_INBOX.to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            upload_dir: "uploads".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            payment_latency: Duration::ZERO,
        }
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
