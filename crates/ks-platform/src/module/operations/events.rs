//! Module Domain Events

use serde::{Deserialize, Serialize};
use crate::module::ModuleType;
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::impl_domain_event;

/// Event emitted when a module and its public action are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub module_id: String,
    pub package_id: String,
    pub name: String,
    pub module_type: ModuleType,
    pub public_action_id: String,
}

impl_domain_event!(ModuleCreated);

impl ModuleCreated {
    const EVENT_TYPE: &'static str = "platform:packages:module:created";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "platform:module";

    pub fn new(
        ctx: &ExecutionContext,
        module_id: &str,
        package_id: &str,
        name: &str,
        module_type: ModuleType,
        public_action_id: &str,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                "module",
                module_id,
            ),
            module_id: module_id.to_string(),
            package_id: package_id.to_string(),
            name: name.to_string(),
            module_type,
            public_action_id: public_action_id.to_string(),
        }
    }
}

/// Event emitted when a module draft changes. An empty `changed_fields`
/// means the update was a no-op and nothing was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleUpdated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub module_id: String,
    pub changed_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl_domain_event!(ModuleUpdated);

impl ModuleUpdated {
    const EVENT_TYPE: &'static str = "platform:packages:module:updated";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "platform:module";

    pub fn new(
        ctx: &ExecutionContext,
        module_id: &str,
        changed_fields: Vec<String>,
        name: Option<String>,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                "module",
                module_id,
            ),
            module_id: module_id.to_string(),
            changed_fields,
            name,
        }
    }
}

/// Event emitted when a module and everything it owns is archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDeleted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub module_id: String,
    pub archived_action_ids: Vec<String>,
    pub archived_collection_ids: Vec<String>,
}

impl_domain_event!(ModuleDeleted);

impl ModuleDeleted {
    const EVENT_TYPE: &'static str = "platform:packages:module:deleted";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "platform:module";

    pub fn new(
        ctx: &ExecutionContext,
        module_id: &str,
        archived_action_ids: Vec<String>,
        archived_collection_ids: Vec<String>,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                "module",
                module_id,
            ),
            module_id: module_id.to_string(),
            archived_action_ids,
            archived_collection_ids,
        }
    }
}
