//! Publishable trait and shared publishing state

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::package::Package;
use crate::shared::error::{PlatformError, Result};
use crate::usecase::{PendingWrite, UseCaseError};

/// Old entity id -> id of the entity created from it in this pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdRemap {
    ids: BTreeMap<String, String>,
}

impl IdRemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, old_id: impl Into<String>, new_id: impl Into<String>) {
        self.ids.insert(old_id.into(), new_id.into());
    }

    pub fn get(&self, old_id: &str) -> Option<&str> {
        self.ids.get(old_id).map(String::as_str)
    }

    /// Remap an optional reference; references outside the table are kept.
    pub fn remap(&self, old_id: Option<&str>) -> Option<String> {
        old_id.map(|id| self.get(id).unwrap_or(id).to_string())
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.ids.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<(String, String)> for IdRemap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { ids: iter.into_iter().collect() }
    }
}

/// State shared by the publishers of one publish run.
#[derive(Debug, Clone)]
pub struct PublishingMeta {
    pub source_package: Package,
    pub published_package: Package,
    pub published_at: DateTime<Utc>,
    /// Source module id -> published module id
    pub module_ids: IdRemap,
    /// Source collection id -> published collection id
    pub collection_ids: IdRemap,
    /// Source action id -> published action id
    pub action_ids: IdRemap,
}

impl PublishingMeta {
    pub fn new(source_package: Package, published_package: Package) -> Self {
        Self {
            published_at: published_package.last_published_at.unwrap_or_else(Utc::now),
            source_package,
            published_package,
            module_ids: IdRemap::new(),
            collection_ids: IdRemap::new(),
            action_ids: IdRemap::new(),
        }
    }
}

/// One entity kind taking part in a package publish.
#[async_trait]
pub trait PackagePublishable: Send + Sync {
    type Entity: Send + Sync;

    /// Build the published copies of this kind, recording the id remaps
    /// later publishers depend on. Nothing is persisted here.
    async fn publishable_entities(&self, meta: &mut PublishingMeta) -> Result<Vec<Self::Entity>>;

    /// Publishing into existing published entities (publish in place).
    async fn update_publishable_entities(
        &self,
        _meta: &PublishingMeta,
        _entities: Vec<Self::Entity>,
    ) -> Result<Vec<Self::Entity>> {
        Err(PlatformError::unsupported(
            "Updating published entities in place is not supported; publish a new version",
        ))
    }

    fn pending_writes(&self, entities: &[Self::Entity]) -> std::result::Result<Vec<PendingWrite>, UseCaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_keeps_unknown_references() {
        let mut remap = IdRemap::new();
        remap.insert("old", "new");

        assert_eq!(remap.remap(Some("old")).as_deref(), Some("new"));
        assert_eq!(remap.remap(Some("other")).as_deref(), Some("other"));
        assert_eq!(remap.remap(None), None);
        assert_eq!(remap.source_ids(), vec!["old".to_string()]);
    }
}
