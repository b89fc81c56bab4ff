//! Module Instance Domain Events

use serde::{Deserialize, Serialize};
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::impl_domain_event;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInstanceCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub module_instance_id: String,
    pub source_module_id: String,
    pub application_id: String,
    pub name: String,
}

impl_domain_event!(ModuleInstanceCreated);

impl ModuleInstanceCreated {
    const EVENT_TYPE: &'static str = "platform:packages:module-instance:created";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "platform:module-instance";

    pub fn new(
        ctx: &ExecutionContext,
        module_instance_id: &str,
        source_module_id: &str,
        application_id: &str,
        name: &str,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                "moduleInstance",
                module_instance_id,
            ),
            module_instance_id: module_instance_id.to_string(),
            source_module_id: source_module_id.to_string(),
            application_id: application_id.to_string(),
            name: name.to_string(),
        }
    }
}
