//! Package Entity
//!
//! A package bundles modules. Editors work on the draft package; every
//! publish creates a new published copy carrying the next version.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::permission::{Policy, Secured};
use crate::usecase::HasId;

pub const PACKAGES_COLLECTION: &str = "packages";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(rename = "_id")]
    pub id: String,

    /// Stable across the draft and every published version
    pub package_uuid: String,

    pub name: String,

    pub workspace_id: String,

    /// "1", "2", ... on published copies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Draft package this copy was published from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_package_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub last_published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub policies: Vec<Policy>,

    #[serde(skip_serializing_if = "Option::is_none", default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        workspace_id: impl Into<String>,
        policies: Vec<Policy>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            package_uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            workspace_id: workspace_id.into(),
            version: None,
            source_package_id: None,
            last_published_at: None,
            policies,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published_copy(&self) -> bool {
        self.source_package_id.is_some()
    }

    /// New published version of this draft package.
    pub fn published_copy(&self, version: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            package_uuid: self.package_uuid.clone(),
            name: self.name.clone(),
            workspace_id: self.workspace_id.clone(),
            version: Some(version.into()),
            source_package_id: Some(self.id.clone()),
            last_published_at: Some(published_at),
            policies: self.policies.clone(),
            deleted_at: None,
            created_at: published_at,
            updated_at: published_at,
        }
    }
}

impl HasId for Package {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        PACKAGES_COLLECTION
    }
}

impl Secured for Package {
    const RESOURCE: &'static str = "package";

    fn policies(&self) -> &[Policy] {
        &self.policies
    }

    fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_copy_keeps_uuid() {
        let draft = Package::new("billing", "ws-1", vec![Policy::new("package:read", ["devs"])]);
        let copy = draft.published_copy("1", Utc::now());

        assert_ne!(copy.id, draft.id);
        assert_eq!(copy.package_uuid, draft.package_uuid);
        assert_eq!(copy.source_package_id.as_deref(), Some(draft.id.as_str()));
        assert_eq!(copy.version.as_deref(), Some("1"));
        assert_eq!(copy.policies, draft.policies);
        assert!(copy.is_published_copy());
        assert!(!draft.is_published_copy());
    }

    #[test]
    fn test_bson_round_trip_omits_empty_optionals() {
        let package = Package::new("billing", "ws-1", Vec::new());
        let document = bson::to_document(&package).unwrap();
        assert!(!document.contains_key("deletedAt"));
        assert!(!document.contains_key("sourcePackageId"));

        let back: Package = bson::from_document(document).unwrap();
        assert_eq!(back.id, package.id);
    }
}
