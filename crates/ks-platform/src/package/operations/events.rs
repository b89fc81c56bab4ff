//! Package Domain Events

use serde::{Deserialize, Serialize};
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::impl_domain_event;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub package_id: String,
    pub name: String,
    pub workspace_id: String,
}

impl_domain_event!(PackageCreated);

impl PackageCreated {
    const EVENT_TYPE: &'static str = "platform:packages:package:created";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "platform:package";

    pub fn new(ctx: &ExecutionContext, package_id: &str, name: &str, workspace_id: &str) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                "package",
                package_id,
            ),
            package_id: package_id.to_string(),
            name: name.to_string(),
            workspace_id: workspace_id.to_string(),
        }
    }
}

/// Event emitted when a new published version of a package is committed.
/// The subject is the draft package.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagePublished {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub package_id: String,
    pub published_package_id: String,
    pub version: String,
    pub published_module_ids: Vec<String>,
    pub published_action_count: usize,
    pub published_collection_count: usize,
}

impl_domain_event!(PackagePublished);

impl PackagePublished {
    const EVENT_TYPE: &'static str = "platform:packages:package:published";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "platform:package";

    pub fn new(
        ctx: &ExecutionContext,
        package_id: &str,
        published_package_id: &str,
        version: &str,
        published_module_ids: Vec<String>,
        published_action_count: usize,
        published_collection_count: usize,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                "package",
                package_id,
            ),
            package_id: package_id.to_string(),
            published_package_id: published_package_id.to_string(),
            version: version.to_string(),
            published_module_ids,
            published_action_count,
            published_collection_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDeleted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub package_id: String,
    pub archived_module_ids: Vec<String>,
}

impl_domain_event!(PackageDeleted);

impl PackageDeleted {
    const EVENT_TYPE: &'static str = "platform:packages:package:deleted";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "platform:package";

    pub fn new(ctx: &ExecutionContext, package_id: &str, archived_module_ids: Vec<String>) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                "package",
                package_id,
            ),
            package_id: package_id.to_string(),
            archived_module_ids,
        }
    }
}
