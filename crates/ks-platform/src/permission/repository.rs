//! Permission Group Repository

use std::sync::Arc;

use bson::doc;

use super::entity::PermissionGroup;
use crate::shared::error::Result;
use crate::shared::store::{DocumentStore, EntityCollection};

pub struct PermissionGroupRepository {
    collection: EntityCollection<PermissionGroup>,
}

impl PermissionGroupRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection: EntityCollection::new(store),
        }
    }

    pub async fn insert(&self, group: &PermissionGroup) -> Result<()> {
        self.collection.upsert(group).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<PermissionGroup>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_by_assigned_user(&self, user_id: &str) -> Result<Vec<PermissionGroup>> {
        self.collection.find(doc! { "assignedToUserIds": user_id }).await
    }
}
