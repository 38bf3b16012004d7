use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{LockType, OnConflict};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use super::{CHANGE_FEED_CAPACITY, DocumentStore, StoreError, StorePath, tree};
use crate::entity::documents::{ActiveModel, Column, Entity as Documents, Model};

/// Document store backed by a `documents` JSONB table.
///
/// Mutations lock the collection row for the duration of a short
/// read-modify-write transaction; concurrent writers to the same collection
/// serialize, and the last one wins.
pub struct PgStore {
    orm: DatabaseConnection,
    changes: broadcast::Sender<StorePath>,
}

impl PgStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { orm, changes }
    }

    /// Run `mutate` against the locked collection row and persist the result.
    async fn mutate<F, R>(&self, path: &StorePath, mutate: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Value) -> R + Send,
        R: Send,
    {
        let txn = self.orm.begin().await?;
        ensure_row(&txn, path.head()).await?;
        let existing = Documents::find_by_id(path.head().to_string())
            .lock(LockType::Update)
            .one(&txn)
            .await?;

        let mut root = existing
            .as_ref()
            .map(|row| row.value.clone())
            .unwrap_or_else(|| Value::Object(Map::new()));
        let result = mutate(&mut root);

        persist(&txn, path.head(), existing, root).await?;
        txn.commit().await?;

        let _ = self.changes.send(path.clone());
        Ok(result)
    }
}

/// Create the collection row if it is missing so `FOR UPDATE` has a row to
/// lock. A concurrent creator makes this wait, then do nothing.
async fn ensure_row(txn: &DatabaseTransaction, head: &str) -> Result<(), StoreError> {
    Documents::insert(ActiveModel {
        root: Set(head.to_string()),
        value: Set(Value::Object(Map::new())),
        updated_at: NotSet,
    })
    .on_conflict(OnConflict::column(Column::Root).do_nothing().to_owned())
    .do_nothing()
    .exec(txn)
    .await?;
    Ok(())
}

async fn persist(
    txn: &DatabaseTransaction,
    head: &str,
    existing: Option<Model>,
    root: Value,
) -> Result<(), StoreError> {
    match existing {
        Some(row) if tree::is_empty(&root) => {
            Documents::delete_by_id(row.root).exec(txn).await?;
        }
        Some(row) => {
            let mut active: ActiveModel = row.into();
            active.value = Set(root);
            active.updated_at = Set(Utc::now().into());
            active.update(txn).await?;
        }
        None if tree::is_empty(&root) => {}
        None => {
            ActiveModel {
                root: Set(head.to_string()),
                value: Set(root),
                updated_at: NotSet,
            }
            .insert(txn)
            .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let row = Documents::find_by_id(path.head().to_string())
            .one(&self.orm)
            .await?;
        Ok(row.and_then(|row| tree::get(&row.value, path.tail()).cloned()))
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let tail = path.tail().to_vec();
        self.mutate(path, move |root| tree::set(root, &tail, value))
            .await
    }

    async fn update(&self, path: &StorePath, patch: Map<String, Value>) -> Result<(), StoreError> {
        let tail = path.tail().to_vec();
        self.mutate(path, move |root| tree::update(root, &tail, patch))
            .await
    }

    async fn remove(&self, path: &StorePath) -> Result<bool, StoreError> {
        let tail = path.tail().to_vec();
        self.mutate(path, move |root| tree::remove(root, &tail))
            .await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorePath> {
        self.changes.subscribe()
    }
}
