#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use baristaflow_api::{
    config::AppConfig,
    dto::auth::RegisterRequest,
    mail::RecordingMailer,
    middleware::auth::AuthUser,
    models::Role,
    services::auth_service::{register_user, user_path},
    state::AppState,
    store::{DocumentStore, MemoryStore, StoreError, StorePath},
};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

pub const JWT_SECRET: &str = "test-secret";

pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

pub fn app() -> TestApp {
    app_with(Arc::new(MemoryStore::new()), RecordingMailer::default())
}

pub fn app_with(store: Arc<dyn DocumentStore>, mailer: RecordingMailer) -> TestApp {
    let mailer = Arc::new(mailer);
    let state = AppState::new(store, mailer.clone(), AppConfig::local(JWT_SECRET));
    TestApp { state, mailer }
}

pub async fn register(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    let resp = register_user(
        state,
        RegisterRequest {
            email: format!("{}@example.com", username.to_lowercase()),
            password: "password123".to_string(),
            username: username.to_string(),
        },
    )
    .await?;
    let user = resp.data.expect("registered user");
    Ok(AuthUser {
        uid: user.uid,
        role: user.role,
    })
}

pub async fn register_educator(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    let user = register(state, username).await?;
    let mut patch = Map::new();
    patch.insert("role".into(), Value::from(Role::EducatorApproved.as_str()));
    state.store.update(&user_path(&user.uid)?, patch).await?;
    Ok(AuthUser {
        role: Role::EducatorApproved,
        ..user
    })
}

/// Delegates to an in-memory store but fails every read and write under one
/// top-level collection. `read_only` keeps reads working and fails writes.
pub struct BrokenCollection {
    inner: MemoryStore,
    broken: &'static str,
    reads_ok: bool,
}

impl BrokenCollection {
    pub fn new(broken: &'static str) -> Self {
        Self {
            inner: MemoryStore::new(),
            broken,
            reads_ok: false,
        }
    }

    pub fn read_only(broken: &'static str) -> Self {
        Self {
            reads_ok: true,
            ..Self::new(broken)
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, path: &StorePath) -> Result<(), StoreError> {
        if path.head() == self.broken {
            return Err(StoreError::Backend(format!("{} is unavailable", self.broken)));
        }
        Ok(())
    }

    fn check_read(&self, path: &StorePath) -> Result<(), StoreError> {
        if self.reads_ok {
            return Ok(());
        }
        self.check(path)
    }
}

#[async_trait]
impl DocumentStore for BrokenCollection {
    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        self.check_read(path)?;
        self.inner.get(path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.check(path)?;
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &StorePath, patch: Map<String, Value>) -> Result<(), StoreError> {
        self.check(path)?;
        self.inner.update(path, patch).await
    }

    async fn remove(&self, path: &StorePath) -> Result<bool, StoreError> {
        self.check(path)?;
        self.inner.remove(path).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorePath> {
        self.inner.subscribe()
    }
}
