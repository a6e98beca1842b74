//! Creates the post and user collections with their field mappings when missing.

use crate::store::{RecordStore, StoreError};
use serde_json::{Value, json};

/// Mapping for the post collection: geo-point `location`, float `face`, keyword metadata.
pub fn post_schema() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "user": { "type": "keyword" },
                "message": { "type": "keyword" },
                "location": { "type": "geo_point" },
                "url": { "type": "keyword", "index": false },
                "type": { "type": "keyword", "index": false },
                "face": { "type": "float" }
            }
        }
    })
}

/// Mapping for the user collection: keyword `username`, unindexed `password`.
pub fn user_schema() -> Value {
    json!({
        "mappings": {
            "properties": {
                "username": { "type": "keyword" },
                "password": { "type": "keyword", "index": false },
                "age": { "type": "long", "index": false },
                "gender": { "type": "keyword", "index": false }
            }
        }
    })
}

/// Collections missing from the store, paired with the schema they need.
pub async fn missing_collections(
    store: &dyn RecordStore,
    posts: &str,
    users: &str,
) -> Result<Vec<(String, Value)>, StoreError> {
    let mut missing = Vec::new();
    for (name, schema) in [(posts, post_schema()), (users, user_schema())] {
        if store.exists(name).await? {
            tracing::debug!(collection = name, "Collection already present");
        } else {
            missing.push((name.to_string(), schema));
        }
    }
    Ok(missing)
}

/// Create any missing collection and return the names that were created.
pub async fn ensure_collections(
    store: &dyn RecordStore,
    posts: &str,
    users: &str,
) -> Result<Vec<String>, StoreError> {
    let mut created = Vec::new();
    for (name, schema) in missing_collections(store, posts, users).await? {
        store.create_collection(&name, &schema).await?;
        tracing::info!(collection = %name, "Created collection");
        created.push(name);
    }
    Ok(created)
}
