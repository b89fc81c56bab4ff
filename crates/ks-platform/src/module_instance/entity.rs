//! Module Instance Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::permission::{Policy, Secured};
use crate::usecase::HasId;

pub const MODULE_INSTANCES_COLLECTION: &str = "module_instances";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInstance {
    #[serde(rename = "_id")]
    pub id: String,

    /// Published module this instance was created from
    pub source_module_id: String,

    pub application_id: String,

    pub name: String,

    /// Outermost instance when instances are nested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_module_instance_id: Option<String>,

    #[serde(default)]
    pub policies: Vec<Policy>,

    #[serde(skip_serializing_if = "Option::is_none", default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ModuleInstance {
    pub fn new(
        source_module_id: impl Into<String>,
        application_id: impl Into<String>,
        name: impl Into<String>,
        policies: Vec<Policy>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            source_module_id: source_module_id.into(),
            application_id: application_id.into(),
            name: name.into(),
            root_module_instance_id: None,
            policies,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl HasId for ModuleInstance {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        MODULE_INSTANCES_COLLECTION
    }
}

impl Secured for ModuleInstance {
    const RESOURCE: &'static str = "moduleInstance";

    fn policies(&self) -> &[Policy] {
        &self.policies
    }

    fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }
}
