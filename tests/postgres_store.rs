use baristaflow_api::{
    db::{create_pool, orm_from_pool, run_migrations},
    store::{DocumentStore, PgStore, StorePath},
};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use uuid::Uuid;

// These run against a real database; skipped when none is configured.
async fn connect() -> anyhow::Result<Option<PgStore>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run store tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    Ok(Some(PgStore::new(orm_from_pool(pool))))
}

#[tokio::test]
async fn pg_store_round_trips_nested_documents() -> anyhow::Result<()> {
    let Some(store) = connect().await? else {
        return Ok(());
    };
    let mut changes = store.subscribe();

    let root = StorePath::root(format!("test_{}", Uuid::new_v4().simple()))?;
    let user = root.clone().child("u1")?;
    store
        .set(&user, json!({ "username": "Ana", "role": "normal" }))
        .await?;
    assert_eq!(changes.recv().await?, user);

    let mut patch = Map::new();
    patch.insert("following/u2".into(), Value::Bool(true));
    patch.insert("role".into(), Value::Null);
    store.update(&user, patch).await?;

    let stored = store.get(&user).await?.expect("stored user");
    assert_eq!(
        stored,
        json!({ "username": "Ana", "following": { "u2": true } })
    );

    assert!(store.remove(&user).await?);
    assert!(!store.remove(&user).await?);
    assert_eq!(store.get(&user).await?, None);

    store.remove(&root).await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_writes_to_a_new_collection_all_land() -> anyhow::Result<()> {
    let Some(store) = connect().await? else {
        return Ok(());
    };
    let store = Arc::new(store);
    let root = StorePath::root(format!("test_{}", Uuid::new_v4().simple()))?;

    let mut writers = Vec::new();
    for n in 0..8 {
        let store = store.clone();
        let path = root.clone().child(format!("n{n}"))?;
        writers.push(tokio::spawn(
            async move { store.set(&path, json!({ "n": n })).await },
        ));
    }
    for writer in writers {
        writer.await??;
    }

    let stored = store.get(&root).await?.expect("collection");
    assert_eq!(stored.as_object().map(Map::len), Some(8));

    store.remove(&root).await?;
    Ok(())
}
