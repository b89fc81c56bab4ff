//! Module Repository

use std::sync::Arc;

use bson::doc;

use super::entity::Module;
use crate::shared::error::Result;
use crate::shared::store::{DocumentStore, EntityCollection};

pub struct ModuleRepository {
    collection: EntityCollection<Module>,
}

impl ModuleRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection: EntityCollection::new(store),
        }
    }

    /// Includes archived modules; the permission gate hides them.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Module>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_by_package(&self, package_id: &str) -> Result<Vec<Module>> {
        self.collection
            .find(doc! { "packageId": package_id, "deletedAt": null })
            .await
    }

    pub async fn find_by_packages(&self, package_ids: &[String]) -> Result<Vec<Module>> {
        self.collection
            .find(doc! { "packageId": { "$in": package_ids.to_vec() }, "deletedAt": null })
            .await
    }

    /// Live module of the package with the given draft name.
    pub async fn find_by_name(&self, package_id: &str, name: &str) -> Result<Option<Module>> {
        self.collection
            .find_one(doc! { "packageId": package_id, "draft.name": name, "deletedAt": null })
            .await
    }

    /// Live published copies made from a draft module.
    pub async fn find_published_copies(&self, origin_module_id: &str) -> Result<Vec<Module>> {
        self.collection
            .find(doc! { "originModuleId": origin_module_id, "deletedAt": null })
            .await
    }
}
