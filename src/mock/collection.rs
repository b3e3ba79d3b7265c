use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::errors::{MockError, MockResult};
use crate::mock::entities::Resource;

/// Fields a patch may not overwrite
const PROTECTED_FIELDS: &[&str] = &["id", "created_at"];

struct Inner<E> {
    items: Vec<E>,
    next_id: u64,
}

/// Ordered, lock-protected store for one resource type.
///
/// Ids come from a counter that only moves forward, so a delete never frees
/// an id for reuse and concurrent creates never collide.
pub struct Collection<E> {
    inner: RwLock<Inner<E>>,
}

impl<E: Resource> Collection<E> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Seed the collection; the counter starts after the largest numeric id
    pub fn with_items(items: Vec<E>) -> Self {
        let next_id = items
            .iter()
            .filter_map(|item| item.id().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            inner: RwLock::new(Inner { items, next_id }),
        }
    }

    pub async fn list(&self) -> Vec<E> {
        self.inner.read().await.items.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, id: &str) -> MockResult<E> {
        self.inner
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| MockError::not_found(E::KIND, id))
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner
            .read()
            .await
            .items
            .iter()
            .any(|item| item.id() == id)
    }

    pub async fn filter<F>(&self, predicate: F) -> Vec<E>
    where
        F: Fn(&E) -> bool,
    {
        self.inner
            .read()
            .await
            .items
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Append a record built from the next id
    pub async fn insert_with<F>(&self, build: F) -> E
    where
        F: FnOnce(String) -> E,
    {
        let mut inner = self.inner.write().await;
        let id = inner.next_id.to_string();
        inner.next_id += 1;
        let item = build(id);
        inner.items.push(item.clone());
        item
    }

    /// Apply `change` to the record in place and return the result
    pub async fn modify<F>(&self, id: &str, change: F) -> MockResult<E>
    where
        F: FnOnce(&mut E),
    {
        let mut inner = self.inner.write().await;
        let item = inner
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| MockError::not_found(E::KIND, id))?;
        change(item);
        Ok(item.clone())
    }

    /// Shallow-merge a JSON object into the record and refresh `updated_at`
    pub async fn update(&self, id: &str, patch: &Value) -> MockResult<E> {
        let mut inner = self.inner.write().await;
        let item = inner
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| MockError::not_found(E::KIND, id))?;

        let mut merged = merge_patch(item, patch)?;
        merged.touch(Utc::now());
        *item = merged.clone();
        Ok(merged)
    }

    pub async fn remove(&self, id: &str) -> MockResult<E> {
        let mut inner = self.inner.write().await;
        let index = inner
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| MockError::not_found(E::KIND, id))?;
        Ok(inner.items.remove(index))
    }
}

impl<E: Resource> Default for Collection<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_patch<E: Resource>(record: &E, patch: &Value) -> MockResult<E> {
    let invalid = |reason: String| MockError::InvalidPatch {
        kind: E::KIND,
        id: record.id().to_string(),
        reason,
    };

    let Value::Object(fields) = patch else {
        return Err(invalid("expected a JSON object".to_string()));
    };

    let mut current = serde_json::to_value(record).map_err(|e| invalid(e.to_string()))?;
    if let Value::Object(existing) = &mut current {
        for (key, value) in fields {
            if PROTECTED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            existing.insert(key.clone(), value.clone());
        }
    }

    serde_json::from_value(current).map_err(|e| invalid(e.to_string()))
}
