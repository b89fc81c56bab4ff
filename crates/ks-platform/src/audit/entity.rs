//! Audit Log Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::event::entity::{aggregate_id, aggregate_type};
use crate::usecase::DomainEvent;

pub const AUDIT_LOGS_COLLECTION: &str = "audit_logs";

/// One entry per committed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    #[serde(rename = "_id")]
    pub id: String,

    /// Entity type affected (e.g., "Module", "Package")
    pub entity_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// Command type name (e.g., "CreateModuleCommand")
    pub operation: String,

    /// Full command payload as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_json: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub performed_at: DateTime<Utc>,
}

impl AuditLog {
    /// Audit entry for `command`, attributed to the aggregate named in the
    /// event subject.
    pub fn for_command<E: DomainEvent, C: Serialize>(event: &E, command: &C) -> Self {
        let operation = std::any::type_name::<C>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string();

        Self {
            id: crate::TsidGenerator::generate(),
            entity_type: aggregate_type(event.subject()),
            entity_id: aggregate_id(event.subject()),
            operation,
            operation_json: serde_json::to_string(command).ok(),
            principal_id: Some(event.principal_id().to_string()),
            performed_at: event.time(),
        }
    }
}
