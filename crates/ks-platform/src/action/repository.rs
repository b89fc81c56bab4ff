//! Action Repository

use std::sync::Arc;

use bson::doc;

use super::entity::Action;
use crate::shared::error::Result;
use crate::shared::store::{DocumentStore, EntityCollection};

pub struct ActionRepository {
    collection: EntityCollection<Action>,
}

impl ActionRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection: EntityCollection::new(store),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Action>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    /// Live actions bound directly to one of the modules (not inside a
    /// collection).
    pub async fn find_module_actions(&self, module_ids: &[String]) -> Result<Vec<Action>> {
        self.collection
            .find(doc! {
                "moduleId": { "$in": module_ids.to_vec() },
                "collectionId": null,
                "deletedAt": null,
            })
            .await
    }

    /// Every live action of the modules or collections, JS actions included.
    pub async fn find_owned_by(&self, module_ids: &[String], collection_ids: &[String]) -> Result<Vec<Action>> {
        self.collection
            .find(doc! {
                "deletedAt": null,
                "$or": [
                    { "moduleId": { "$in": module_ids.to_vec() } },
                    { "collectionId": { "$in": collection_ids.to_vec() } },
                ],
            })
            .await
    }

    pub async fn find_by_collection(&self, collection_id: &str) -> Result<Vec<Action>> {
        self.collection
            .find(doc! { "collectionId": collection_id, "deletedAt": null })
            .await
    }

    /// The hidden public action of a module.
    pub async fn find_public_action(&self, module_id: &str) -> Result<Option<Action>> {
        self.collection
            .find_one(doc! { "moduleId": module_id, "isPublic": true, "deletedAt": null })
            .await
    }

    pub async fn find_by_application(&self, application_id: &str) -> Result<Vec<Action>> {
        self.collection
            .find(doc! { "applicationId": application_id, "deletedAt": null })
            .await
    }

    /// Actions of an application an import may update: those not created
    /// through a module instance, plus public actions.
    pub async fn find_import_candidates(&self, application_id: &str) -> Result<Vec<Action>> {
        self.collection
            .find(doc! {
                "applicationId": application_id,
                "deletedAt": null,
                "$or": [
                    { "rootModuleInstanceId": null },
                    { "isPublic": true },
                ],
            })
            .await
    }
}
