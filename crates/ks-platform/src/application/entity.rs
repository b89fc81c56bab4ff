//! Application Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::permission::{Policy, Secured};
use crate::usecase::HasId;

pub const APPLICATIONS_COLLECTION: &str = "applications";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    pub workspace_id: String,

    #[serde(default)]
    pub policies: Vec<Policy>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(name: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            name: name.into(),
            workspace_id: workspace_id.into(),
            policies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }
}

impl HasId for Application {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        APPLICATIONS_COLLECTION
    }
}

impl Secured for Application {
    const RESOURCE: &'static str = "application";

    fn policies(&self) -> &[Policy] {
        &self.policies
    }
}
