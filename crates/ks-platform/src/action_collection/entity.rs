//! Action Collection Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::permission::{Policy, Secured};
use crate::usecase::HasId;

pub const ACTION_COLLECTIONS_COLLECTION: &str = "action_collections";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSnapshot {
    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub body: Option<String>,

    #[serde(default)]
    pub variables: serde_json::Value,

    /// JS actions of this collection, in declaration order
    #[serde(default)]
    pub action_ids: Vec<String>,
}

impl CollectionSnapshot {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCollection {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    #[serde(default)]
    pub draft: CollectionSnapshot,

    #[serde(default)]
    pub published: CollectionSnapshot,

    #[serde(default)]
    pub policies: Vec<Policy>,

    #[serde(skip_serializing_if = "Option::is_none", default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ActionCollection {
    pub fn new(draft: CollectionSnapshot, policies: Vec<Policy>) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            module_id: None,
            application_id: None,
            draft,
            published: CollectionSnapshot::default(),
            policies,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_module(mut self, module_id: impl Into<String>) -> Self {
        self.module_id = Some(module_id.into());
        self
    }
}

impl HasId for ActionCollection {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        ACTION_COLLECTIONS_COLLECTION
    }
}

impl Secured for ActionCollection {
    const RESOURCE: &'static str = "actionCollection";

    fn policies(&self) -> &[Policy] {
        &self.policies
    }

    fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }
}
