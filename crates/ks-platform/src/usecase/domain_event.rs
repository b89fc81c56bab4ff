//! Domain Event Trait
//!
//! Base trait for all domain events. Events follow the CloudEvents structure
//! with additional fields for tracing and ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ExecutionContext;
use crate::shared::tsid::TsidGenerator;

/// Base trait for all domain events.
///
/// Events are named in past tense (`ModuleCreated`, `PackagePublished`).
///
/// - Event type: `{app}:{domain}:{aggregate}:{action}`, e.g. `platform:packages:module:created`
/// - Subject: `{domain}.{aggregate}.{id}`, e.g. `platform.module.0HZXEQ5Y8JY5Z`
/// - Message group: `{domain}:{aggregate}:{id}`; events in one group are ordered
pub trait DomainEvent: Send + Sync {
    fn event_id(&self) -> &str;

    fn event_type(&self) -> &str;

    fn spec_version(&self) -> &str;

    fn source(&self) -> &str;

    fn subject(&self) -> &str;

    fn time(&self) -> DateTime<Utc>;

    fn execution_id(&self) -> &str;

    fn correlation_id(&self) -> &str;

    fn causation_id(&self) -> Option<&str>;

    fn principal_id(&self) -> &str;

    fn message_group(&self) -> &str;

    /// Serialize the event-specific data payload to JSON.
    fn to_data_json(&self) -> String;
}

/// Common metadata for domain events.
///
/// Event structs embed this as a flattened `metadata` field and get the
/// trait implementation from [`impl_domain_event!`](crate::impl_domain_event).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub event_id: String,
    pub event_type: String,
    pub spec_version: String,
    pub source: String,
    pub subject: String,
    pub time: DateTime<Utc>,
    pub execution_id: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    pub principal_id: String,
    pub message_group: String,
}

impl EventMetadata {
    /// Build metadata for an event about `aggregate` `aggregate_id`,
    /// copying the tracing fields from the execution context.
    pub fn new(
        ctx: &ExecutionContext,
        event_type: &str,
        spec_version: &str,
        source: &str,
        aggregate: &str,
        aggregate_id: &str,
    ) -> Self {
        Self {
            event_id: TsidGenerator::generate(),
            event_type: event_type.to_string(),
            spec_version: spec_version.to_string(),
            source: source.to_string(),
            subject: format!("platform.{}.{}", aggregate, aggregate_id),
            time: Utc::now(),
            execution_id: ctx.execution_id.clone(),
            correlation_id: ctx.correlation_id.clone(),
            causation_id: ctx.causation_id.clone(),
            principal_id: ctx.principal_id.clone(),
            message_group: format!("platform:{}:{}", aggregate, aggregate_id),
        }
    }
}

/// Implements [`DomainEvent`] by delegating to a `metadata: EventMetadata` field.
///
/// ```ignore
/// #[derive(Serialize)]
/// pub struct ModuleCreated {
///     #[serde(flatten)]
///     pub metadata: EventMetadata,
///     pub module_id: String,
/// }
///
/// impl_domain_event!(ModuleCreated);
/// ```
#[macro_export]
macro_rules! impl_domain_event {
    ($event_type:ty) => {
        impl $crate::usecase::DomainEvent for $event_type {
            fn event_id(&self) -> &str {
                &self.metadata.event_id
            }

            fn event_type(&self) -> &str {
                &self.metadata.event_type
            }

            fn spec_version(&self) -> &str {
                &self.metadata.spec_version
            }

            fn source(&self) -> &str {
                &self.metadata.source
            }

            fn subject(&self) -> &str {
                &self.metadata.subject
            }

            fn time(&self) -> chrono::DateTime<chrono::Utc> {
                self.metadata.time
            }

            fn execution_id(&self) -> &str {
                &self.metadata.execution_id
            }

            fn correlation_id(&self) -> &str {
                &self.metadata.correlation_id
            }

            fn causation_id(&self) -> Option<&str> {
                self.metadata.causation_id.as_deref()
            }

            fn principal_id(&self) -> &str {
                &self.metadata.principal_id
            }

            fn message_group(&self) -> &str {
                &self.metadata.message_group
            }

            fn to_data_json(&self) -> String {
                serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct TestEvent {
        #[serde(flatten)]
        metadata: EventMetadata,
        pub module_id: String,
    }

    crate::impl_domain_event!(TestEvent);

    #[test]
    fn test_metadata_from_context() {
        let ctx = ExecutionContext::create("user-1");
        let event = TestEvent {
            metadata: EventMetadata::new(
                &ctx,
                "platform:packages:module:created",
                "1.0",
                "platform:packages",
                "module",
                "m-1",
            ),
            module_id: "m-1".to_string(),
        };

        assert_eq!(event.event_type(), "platform:packages:module:created");
        assert_eq!(event.subject(), "platform.module.m-1");
        assert_eq!(event.message_group(), "platform:module:m-1");
        assert_eq!(event.principal_id(), "user-1");
        assert_eq!(event.correlation_id(), ctx.correlation_id);
        assert_eq!(event.event_id().len(), 13);
    }

    #[test]
    fn test_to_data_json() {
        let ctx = ExecutionContext::create("user-1");
        let event = TestEvent {
            metadata: EventMetadata::new(&ctx, "t", "1.0", "s", "module", "m-2"),
            module_id: "m-2".to_string(),
        };

        let json = event.to_data_json();
        assert!(json.contains("\"moduleId\":\"m-2\""));
    }
}
