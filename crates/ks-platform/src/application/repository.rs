//! Application Repository

use std::sync::Arc;

use bson::doc;

use super::entity::Application;
use crate::shared::error::Result;
use crate::shared::store::{DocumentStore, EntityCollection};

pub struct ApplicationRepository {
    collection: EntityCollection<Application>,
}

impl ApplicationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection: EntityCollection::new(store),
        }
    }

    /// Applications are written by the enclosing layer; this exists for
    /// seeding and tests.
    pub async fn insert(&self, application: &Application) -> Result<()> {
        self.collection.upsert(application).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Application>> {
        self.collection.find_one(doc! { "_id": id }).await
    }
}
