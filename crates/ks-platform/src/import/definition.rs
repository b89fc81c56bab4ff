//! Portable action definition
//!
//! The shape actions travel in between applications. It carries content and
//! instance linkage, never policies or the owning application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::action::{Action, ActionSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    /// Id in the exporting application; informational only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,

    #[serde(flatten)]
    pub action: ActionSnapshot,

    #[serde(default)]
    pub is_public: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub collection_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub module_instance_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub root_module_instance_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ActionDefinition {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            action: ActionSnapshot::named(name),
            is_public: false,
            collection_id: None,
            module_instance_id: None,
            root_module_instance_id: None,
            deleted_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.action.name
    }

    pub fn fully_qualified_name(&self) -> &str {
        self.action.fully_qualified_name()
    }

    pub fn in_collection(&self) -> bool {
        self.collection_id.is_some()
    }
}

impl From<&Action> for ActionDefinition {
    fn from(action: &Action) -> Self {
        Self {
            id: Some(action.id.clone()),
            action: action.draft.clone(),
            is_public: action.is_public,
            collection_id: action.collection_id.clone(),
            module_instance_id: action.module_instance_id.clone(),
            root_module_instance_id: action.root_module_instance_id.clone(),
            deleted_at: action.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Policy;

    #[test]
    fn test_definition_drops_policies_and_application() {
        let action = Action::new(ActionSnapshot::named("fetchOrders"), vec![Policy::new("action:read", ["devs"])])
            .in_application("app-1");

        let json = serde_json::to_value(ActionDefinition::from(&action)).unwrap();
        assert_eq!(json["name"], "fetchOrders");
        assert!(json.get("policies").is_none());
        assert!(json.get("applicationId").is_none());
        assert_eq!(json["id"], action.id.as_str());
    }

    #[test]
    fn test_definition_accepts_minimal_payload() {
        let definition: ActionDefinition = serde_json::from_value(serde_json::json!({
            "name": "orders.fetch",
            "isPublic": true,
        }))
        .unwrap();

        assert!(definition.is_public);
        assert_eq!(definition.fully_qualified_name(), "orders.fetch");
        assert!(!definition.in_collection());
    }
}
