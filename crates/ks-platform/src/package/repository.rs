//! Package Repository

use std::sync::Arc;

use bson::doc;

use super::entity::Package;
use crate::shared::error::Result;
use crate::shared::store::{DocumentStore, EntityCollection};

pub struct PackageRepository {
    collection: EntityCollection<Package>,
}

impl PackageRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection: EntityCollection::new(store),
        }
    }

    /// Includes archived packages; the permission gate hides them.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Package>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    /// Live draft package of a workspace with the given name.
    pub async fn find_draft_by_name(&self, workspace_id: &str, name: &str) -> Result<Option<Package>> {
        self.collection
            .find_one(doc! {
                "workspaceId": workspace_id,
                "name": name,
                "sourcePackageId": null,
                "deletedAt": null,
            })
            .await
    }

    /// Number of versions ever published from a draft package.
    pub async fn count_versions(&self, source_package_id: &str) -> Result<u64> {
        self.collection
            .count(doc! { "sourcePackageId": source_package_id })
            .await
    }

    /// Live published packages among `ids`.
    pub async fn find_published_by_ids(&self, ids: &[String]) -> Result<Vec<Package>> {
        self.collection
            .find(doc! {
                "_id": { "$in": ids.to_vec() },
                "sourcePackageId": { "$ne": null },
                "deletedAt": null,
            })
            .await
    }
}
