//! In-Memory Document Store
//!
//! BSON documents grouped by collection and keyed by `_id`, behind a single
//! `parking_lot::RwLock`. Entities round-trip through the same serde shapes as
//! the MongoDB store, so both backends see identical documents.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bson::{Bson, Document};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};

use crate::shared::error::{PlatformError, Result};
use crate::shared::store::DocumentStore;
use crate::usecase::{HasId, PendingWrite};

type Collection = BTreeMap<String, Document>;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity outside of a unit of work (seeding, tests).
    pub fn insert<T: Serialize + HasId>(&self, entity: &T) -> Result<()> {
        let document = bson::to_document(entity)?;
        self.collections
            .write()
            .entry(T::collection_name().to_string())
            .or_default()
            .insert(entity.id().to_string(), document);
        Ok(())
    }

    pub fn find_by_id<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        let guard = self.collections.read();
        match guard.get(collection).and_then(|c| c.get(id)) {
            Some(document) => Ok(Some(bson::from_document(document.clone())?)),
            None => Ok(None),
        }
    }

    /// All entities of a collection, in id order (TSIDs sort by creation time).
    pub fn find_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.documents(collection)
            .into_iter()
            .map(|document| bson::from_document(document).map_err(PlatformError::from))
            .collect()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    /// Apply a batch of writes atomically.
    ///
    /// Every affected document is staged first; nothing becomes visible
    /// unless every write in the batch succeeds.
    pub fn apply(&self, writes: &[PendingWrite]) -> Result<()> {
        let mut guard = self.collections.write();
        let mut staged: HashMap<(&'static str, String), Document> = HashMap::new();

        for write in writes {
            let key = (write.collection(), write.id().to_string());
            match write {
                PendingWrite::Upsert { document, .. } => {
                    staged.insert(key, document.clone());
                }
                PendingWrite::SetFields { collection, id, fields } => {
                    let current = match staged.remove(&key) {
                        Some(document) => Some(document),
                        None => guard.get(*collection).and_then(|c| c.get(id)).cloned(),
                    };
                    let mut document = current
                        .ok_or_else(|| PlatformError::not_found(*collection, id.as_str()))?;
                    for (path, value) in fields {
                        set_path(&mut document, path, value.clone())?;
                    }
                    staged.insert(key, document);
                }
            }
        }

        for ((collection, id), document) in staged {
            guard
                .entry(collection.to_string())
                .or_default()
                .insert(id, document);
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let guard = self.collections.read();
        Ok(guard
            .get(collection)
            .and_then(|c| c.values().find(|d| matches_filter(d, &filter)))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        let guard = self.collections.read();
        Ok(guard
            .get(collection)
            .map(|c| c.values().filter(|d| matches_filter(d, &filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64> {
        let guard = self.collections.read();
        Ok(guard
            .get(collection)
            .map(|c| c.values().filter(|d| matches_filter(d, &filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn upsert(&self, collection: &str, id: &str, document: Document) -> Result<()> {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }
}

fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, condition)| {
        if key == "$or" {
            return match condition {
                Bson::Array(branches) => branches.iter().any(|branch| match branch {
                    Bson::Document(f) => matches_filter(document, f),
                    _ => false,
                }),
                _ => false,
            };
        }

        let value = lookup(document, key);
        match condition {
            Bson::Document(ops) if is_operator_document(ops) => {
                ops.iter().all(|(op, arg)| matches_operator(value, op, arg))
            }
            expected => value_equals(value, expected),
        }
    })
}

fn is_operator_document(document: &Document) -> bool {
    !document.is_empty() && document.keys().all(|k| k.starts_with('$'))
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        match current {
            Bson::Document(inner) => current = inner.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

fn value_equals(value: Option<&Bson>, expected: &Bson) -> bool {
    match (value, expected) {
        (None, Bson::Null) | (Some(Bson::Null), Bson::Null) => true,
        (None, _) => false,
        (Some(Bson::Array(items)), e) if !matches!(e, Bson::Array(_)) => items.contains(e),
        (Some(v), e) => v == e,
    }
}

fn matches_operator(value: Option<&Bson>, op: &str, arg: &Bson) -> bool {
    match (op, arg) {
        ("$in", Bson::Array(candidates)) => candidates.iter().any(|c| value_equals(value, c)),
        ("$nin", Bson::Array(candidates)) => !candidates.iter().any(|c| value_equals(value, c)),
        ("$ne", expected) => !value_equals(value, expected),
        ("$exists", Bson::Boolean(expected)) => value.is_some() == *expected,
        _ => false,
    }
}

/// `$set` semantics for a dotted path: intermediate documents are created
/// when missing, but never written through a non-document value.
fn set_path(document: &mut Document, path: &str, value: Bson) -> Result<()> {
    let Some((head, rest)) = path.split_once('.') else {
        document.insert(path, value);
        return Ok(());
    };

    match document.get(head) {
        Some(Bson::Document(_)) => {}
        None | Some(Bson::Null) => {
            document.insert(head, Document::new());
        }
        Some(_) => {
            return Err(PlatformError::validation(format!(
                "Cannot set '{}': '{}' is not a document",
                path, head
            )));
        }
    }

    match document.get_mut(head) {
        Some(Bson::Document(inner)) => set_path(inner, rest, value),
        _ => Err(PlatformError::internal(format!("Path '{}' vanished while setting", head))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_set_path_creates_nested_documents() {
        let mut document = doc! { "_id": "a" };
        set_path(&mut document, "draft.name", Bson::String("orders".into())).unwrap();
        assert_eq!(document.get_document("draft").unwrap().get_str("name").unwrap(), "orders");
    }

    #[test]
    fn test_set_path_keeps_sibling_fields() {
        let mut document = doc! { "draft": { "name": "a", "inputs": { "x": "1" } } };
        set_path(&mut document, "draft.name", Bson::String("b".into())).unwrap();
        let draft = document.get_document("draft").unwrap();
        assert_eq!(draft.get_str("name").unwrap(), "b");
        assert!(draft.get_document("inputs").is_ok());
    }

    #[test]
    fn test_set_path_rejects_scalar_parent() {
        let mut document = doc! { "draft": "flat" };
        assert!(set_path(&mut document, "draft.name", Bson::String("b".into())).is_err());
    }

    #[tokio::test]
    async fn test_filter_null_matches_missing_field() {
        let store = MemoryStore::new();
        store.upsert("things", "a", doc! { "_id": "a" }).await.unwrap();
        store.upsert("things", "b", doc! { "_id": "b", "deletedAt": "yesterday" }).await.unwrap();

        let live = store.find("things", doc! { "deletedAt": null }).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].get_str("_id").unwrap(), "a");
    }

    #[tokio::test]
    async fn test_filter_operators() {
        let store = MemoryStore::new();
        store.upsert("things", "a", doc! { "_id": "a", "draft": { "name": "x" }, "isPublic": true }).await.unwrap();
        store.upsert("things", "b", doc! { "_id": "b", "draft": { "name": "y" }, "isPublic": false, "root": "r1" }).await.unwrap();
        store.upsert("things", "c", doc! { "_id": "c", "draft": { "name": "z" }, "isPublic": false }).await.unwrap();

        let by_name = store.find("things", doc! { "draft.name": { "$in": ["x", "z"] } }).await.unwrap();
        assert_eq!(by_name.len(), 2);

        let not_a = store.count("things", doc! { "_id": { "$ne": "a" } }).await.unwrap();
        assert_eq!(not_a, 2);

        let candidates = store
            .find("things", doc! { "$or": [ { "root": null }, { "isPublic": true } ] })
            .await
            .unwrap();
        let ids: Vec<&str> = candidates.iter().map(|d| d.get_str("_id").unwrap()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_filter_scalar_matches_array_member() {
        let store = MemoryStore::new();
        store.upsert("groups", "g1", doc! { "_id": "g1", "assignedToUserIds": ["u1", "u2"] }).await.unwrap();

        assert!(store.find_one("groups", doc! { "assignedToUserIds": "u2" }).await.unwrap().is_some());
        assert!(store.find_one("groups", doc! { "assignedToUserIds": "u3" }).await.unwrap().is_none());
    }

    #[test]
    fn test_apply_set_fields_after_upsert_in_same_batch() {
        let store = MemoryStore::new();
        let writes = vec![
            PendingWrite::Upsert {
                collection: "things",
                id: "t1".to_string(),
                document: doc! { "_id": "t1", "name": "first" },
            },
            PendingWrite::set_fields("things", "t1", doc! { "name": "second" }),
        ];
        store.apply(&writes).unwrap();

        let documents = store.documents("things");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].get_str("name").unwrap(), "second");
    }

    #[test]
    fn test_apply_is_atomic() {
        let store = MemoryStore::new();
        let writes = vec![
            PendingWrite::Upsert {
                collection: "things",
                id: "t1".to_string(),
                document: doc! { "_id": "t1" },
            },
            PendingWrite::set_fields("things", "missing", doc! { "name": "x" }),
        ];
        assert!(store.apply(&writes).is_err());
        assert_eq!(store.len("things"), 0);
    }
}
