//! Action Collection Repository

use std::sync::Arc;

use bson::doc;

use super::entity::ActionCollection;
use crate::shared::error::Result;
use crate::shared::store::{DocumentStore, EntityCollection};

pub struct ActionCollectionRepository {
    collection: EntityCollection<ActionCollection>,
}

impl ActionCollectionRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection: EntityCollection::new(store),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ActionCollection>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_by_modules(&self, module_ids: &[String]) -> Result<Vec<ActionCollection>> {
        self.collection
            .find(doc! { "moduleId": { "$in": module_ids.to_vec() }, "deletedAt": null })
            .await
    }
}
