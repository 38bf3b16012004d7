use std::sync::Arc;

use crate::{
    config::AppConfig,
    mail::{LogMailer, MailTransport},
    store::{DocumentStore, MemoryStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub mailer: Arc<dyn MailTransport>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn MailTransport>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            config: Arc::new(config),
        }
    }

    /// In-memory store and log-only mail, for local runs and tests.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(LogMailer),
            config,
        )
    }
}
