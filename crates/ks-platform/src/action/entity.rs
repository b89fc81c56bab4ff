//! Action Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use utoipa::ToSchema;

use crate::permission::{Policy, Secured};
use crate::usecase::HasId;

pub const ACTIONS_COLLECTION: &str = "actions";

/// Where an action lives: on an application page or inside a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionContext {
    #[default]
    Page,
    Module,
}

/// Reference to the datasource an action runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceRef {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub plugin_id: Option<String>,

    /// Resolved by the runtime that hosts the action; carries no id.
    #[serde(default)]
    pub auto_generated: bool,
}

impl DatasourceRef {
    pub fn auto_generated(plugin_id: Option<String>) -> Self {
        Self {
            id: None,
            name: None,
            plugin_id,
            auto_generated: true,
        }
    }
}

/// Versioned action content. The empty snapshot is the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionSnapshot {
    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fully_qualified_name: Option<String>,

    #[serde(default)]
    pub context: ActionContext,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub datasource: Option<DatasourceRef>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub body: Option<String>,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub configuration: serde_json::Value,

    #[serde(default)]
    pub execute_on_load: bool,
}

impl ActionSnapshot {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Name used to match public actions across modules on import.
    pub fn fully_qualified_name(&self) -> &str {
        self.fully_qualified_name.as_deref().unwrap_or(&self.name)
    }

    /// Replace the datasource with an auto-generated reference on the same
    /// plugin.
    pub fn regenerate_datasource(&mut self) {
        let plugin_id = self.datasource.take().and_then(|d| d.plugin_id);
        self.datasource = Some(DatasourceRef::auto_generated(plugin_id));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,

    /// Set for JS actions owned by an action collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    /// The hidden action that exposes a module to its consumers
    #[serde(default)]
    pub is_public: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_instance_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_module_instance_id: Option<String>,

    #[serde(default)]
    pub draft: ActionSnapshot,

    #[serde(default)]
    pub published: ActionSnapshot,

    #[serde(default)]
    pub policies: Vec<Policy>,

    #[serde(skip_serializing_if = "Option::is_none", default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Action {
    pub fn new(draft: ActionSnapshot, policies: Vec<Policy>) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            module_id: None,
            collection_id: None,
            application_id: None,
            is_public: false,
            module_instance_id: None,
            root_module_instance_id: None,
            draft,
            published: ActionSnapshot::default(),
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

    pub fn in_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn in_application(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.draft.name
    }
}

impl HasId for Action {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        ACTIONS_COLLECTION
    }
}

impl Secured for Action {
    const RESOURCE: &'static str = "action";

    fn policies(&self) -> &[Policy] {
        &self.policies
    }

    fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }
}
