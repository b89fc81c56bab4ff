//! Document Store
//!
//! Read access to entity documents, shared by every repository. Writes go
//! through a `UnitOfWork`; `upsert` exists for boundary entities owned by an
//! enclosing layer (applications, permission groups) and for seeding.
//!
//! Filters use the MongoDB query shape (`doc! { "deletedAt": null }`), and the
//! in-memory store evaluates the subset repositories rely on: equality on
//! dotted paths (null matches a missing field, scalars match array members),
//! `$in`, `$nin`, `$ne`, `$exists` and a top-level `$or`.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::Database;
use serde::{de::DeserializeOwned, Serialize};

use crate::shared::error::Result;
use crate::usecase::HasId;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Matching documents in `_id` order.
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>>;

    async fn count(&self, collection: &str, filter: Document) -> Result<u64>;

    async fn upsert(&self, collection: &str, id: &str, document: Document) -> Result<()>;
}

/// MongoDB-backed document store.
#[derive(Clone)]
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        Ok(self.db.collection::<Document>(collection).find_one(filter).await?)
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        let cursor = self.db
            .collection::<Document>(collection)
            .find(filter)
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64> {
        Ok(self.db.collection::<Document>(collection).count_documents(filter).await?)
    }

    async fn upsert(&self, collection: &str, id: &str, document: Document) -> Result<()> {
        self.db
            .collection::<Document>(collection)
            .replace_one(doc! { "_id": id }, document)
            .upsert(true)
            .await?;
        Ok(())
    }
}

/// Typed view over one collection of a [`DocumentStore`].
pub struct EntityCollection<T> {
    store: Arc<dyn DocumentStore>,
    name: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name,
            _entity: PhantomData,
        }
    }
}

impl<T> EntityCollection<T>
where
    T: Serialize + DeserializeOwned + HasId,
{
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            name: T::collection_name(),
            _entity: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        match self.store.find_one(self.name, filter).await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    pub async fn find(&self, filter: Document) -> Result<Vec<T>> {
        let mut entities = Vec::new();
        for document in self.store.find(self.name, filter).await? {
            entities.push(bson::from_document(document)?);
        }
        Ok(entities)
    }

    pub async fn count(&self, filter: Document) -> Result<u64> {
        self.store.count(self.name, filter).await
    }

    pub async fn upsert(&self, entity: &T) -> Result<()> {
        let document = bson::to_document(entity)?;
        self.store.upsert(self.name, entity.id(), document).await
    }
}
