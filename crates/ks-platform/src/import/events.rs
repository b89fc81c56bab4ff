//! Import Domain Events

use serde::{Deserialize, Serialize};
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::impl_domain_event;

/// Event emitted once per import, whatever the number of actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionsImported {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub application_id: String,
    pub created_action_ids: Vec<String>,
    pub updated_action_ids: Vec<String>,
}

impl_domain_event!(ActionsImported);

impl ActionsImported {
    const EVENT_TYPE: &'static str = "platform:packages:application:actions-imported";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "platform:application";

    pub fn new(
        ctx: &ExecutionContext,
        application_id: &str,
        created_action_ids: Vec<String>,
        updated_action_ids: Vec<String>,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                "application",
                application_id,
            ),
            application_id: application_id.to_string(),
            created_action_ids,
            updated_action_ids,
        }
    }
}
