//! Module Entity
//!
//! A reusable unit inside a package. Editors change the `draft` snapshot;
//! `published` is only ever filled by copying a draft at publish time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use utoipa::ToSchema;

use crate::package::Package;
use crate::permission::{Policy, Secured};
use crate::usecase::HasId;

pub const MODULES_COLLECTION: &str = "modules";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleType {
    /// Wraps a single query exposed through its public action
    #[default]
    QueryModule,
    /// Wraps JS objects
    JsModule,
}

/// Versioned module content. The empty snapshot is the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSnapshot {
    #[serde(default)]
    pub name: String,

    /// Input name -> default value expression
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
}

impl ModuleSnapshot {
    pub fn new(name: impl Into<String>, inputs: BTreeMap<String, String>) -> Self {
        Self { name: name.into(), inputs }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[serde(rename = "_id")]
    pub id: String,

    /// Stable across the draft and every published copy
    pub module_uuid: String,

    pub package_id: String,

    pub package_uuid: String,

    #[serde(rename = "type", default)]
    pub module_type: ModuleType,

    /// Draft module a published copy was made from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_module_id: Option<String>,

    #[serde(default)]
    pub draft: ModuleSnapshot,

    #[serde(default)]
    pub published: ModuleSnapshot,

    #[serde(default)]
    pub policies: Vec<Policy>,

    #[serde(skip_serializing_if = "Option::is_none", default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Module {
    /// New draft module inside `package`.
    pub fn new(
        package: &Package,
        module_type: ModuleType,
        draft: ModuleSnapshot,
        policies: Vec<Policy>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            module_uuid: uuid::Uuid::new_v4().to_string(),
            package_id: package.id.clone(),
            package_uuid: package.package_uuid.clone(),
            module_type,
            origin_module_id: None,
            draft,
            published: ModuleSnapshot::default(),
            policies,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn name(&self) -> &str {
        &self.draft.name
    }

    pub fn is_published_copy(&self) -> bool {
        self.origin_module_id.is_some()
    }
}

impl HasId for Module {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        MODULES_COLLECTION
    }
}

impl Secured for Module {
    const RESOURCE: &'static str = "module";

    fn policies(&self) -> &[Policy] {
        &self.policies
    }

    fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }
}
