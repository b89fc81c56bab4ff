//! Event Entity
//!
//! CloudEvents-shaped record written to the `events` collection alongside
//! every committed state change.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::usecase::DomainEvent;

pub const EVENTS_COLLECTION: &str = "events";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Same id as the domain event
    #[serde(rename = "_id")]
    pub id: String,

    /// Format: {application}:{subdomain}:{aggregate}:{event}
    #[serde(rename = "type")]
    pub event_type: String,

    pub source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub time: DateTime<Utc>,

    pub data: serde_json::Value,

    #[serde(default = "default_content_type")]
    pub data_content_type: String,

    #[serde(default = "default_spec_version")]
    pub spec_version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_group: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduplication_id: Option<String>,

    /// Filterable key/value pairs (principal, aggregate type)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_data: Vec<ContextData>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_spec_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextData {
    pub key: String,
    pub value: String,
}

impl Event {
    /// Build the stored record for a domain event.
    pub fn from_domain_event<E: DomainEvent>(event: &E) -> Self {
        let data = serde_json::from_str(&event.to_data_json())
            .unwrap_or_else(|_| serde_json::json!({}));

        Self {
            id: event.event_id().to_string(),
            event_type: event.event_type().to_string(),
            source: event.source().to_string(),
            subject: Some(event.subject().to_string()),
            time: event.time(),
            data,
            data_content_type: default_content_type(),
            spec_version: event.spec_version().to_string(),
            message_group: Some(event.message_group().to_string()),
            correlation_id: Some(event.correlation_id().to_string()),
            causation_id: event.causation_id().map(String::from),
            deduplication_id: Some(format!("{}-{}", event.event_type(), event.event_id())),
            context_data: vec![
                ContextData {
                    key: "principalId".to_string(),
                    value: event.principal_id().to_string(),
                },
                ContextData {
                    key: "aggregateType".to_string(),
                    value: aggregate_type(event.subject()),
                },
            ],
            created_at: Utc::now(),
        }
    }
}

/// "platform.module.123" -> "Module"
pub fn aggregate_type(subject: &str) -> String {
    subject
        .split('.')
        .nth(1)
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

/// "platform.module.123" -> Some("123")
pub fn aggregate_id(subject: &str) -> Option<String> {
    subject.split('.').nth(2).map(String::from)
}
