//! Permission Entities

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use utoipa::ToSchema;

use crate::usecase::HasId;

pub const PERMISSION_GROUPS_COLLECTION: &str = "permission_groups";

/// Permission strings, `{resource}:{capability}`.
pub mod permissions {
    pub const PACKAGE_READ: &str = "package:read";
    pub const PACKAGE_MANAGE: &str = "package:manage";
    pub const PACKAGE_DELETE: &str = "package:delete";
    pub const PACKAGE_PUBLISH: &str = "package:publish";

    pub const MODULE_READ: &str = "module:read";
    pub const MODULE_MANAGE: &str = "module:manage";
    pub const MODULE_DELETE: &str = "module:delete";
    pub const MODULE_CREATE_EXECUTABLES: &str = "module:create-executables";

    pub const ACTION_READ: &str = "action:read";
    pub const ACTION_EXECUTE: &str = "action:execute";
    pub const ACTION_MANAGE: &str = "action:manage";
    pub const ACTION_DELETE: &str = "action:delete";

    pub const APPLICATION_READ: &str = "application:read";
    pub const APPLICATION_MANAGE: &str = "application:manage";
    pub const APPLICATION_DELETE: &str = "application:delete";
}

/// Grants `permission` to every member of the listed permission groups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub permission: String,
    #[serde(default)]
    pub permission_groups: BTreeSet<String>,
}

impl Policy {
    pub fn new<I, S>(permission: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permission: permission.into(),
            permission_groups: groups.into_iter().map(Into::into).collect(),
        }
    }
}

/// Kinds of entity that carry policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Package,
    Module,
    Action,
    ActionCollection,
    ModuleInstance,
    Application,
}

impl ResourceKind {
    /// Prefix of the permissions that apply to this kind. Collections and
    /// module instances are executables and share the action permissions.
    pub fn permission_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Package => "package",
            ResourceKind::Module => "module",
            ResourceKind::Action | ResourceKind::ActionCollection | ResourceKind::ModuleInstance => "action",
            ResourceKind::Application => "application",
        }
    }

    /// Every permission defined for this kind.
    pub fn permissions(&self) -> &'static [&'static str] {
        use permissions::*;
        match self {
            ResourceKind::Package => &[PACKAGE_READ, PACKAGE_MANAGE, PACKAGE_DELETE, PACKAGE_PUBLISH],
            ResourceKind::Module => &[MODULE_READ, MODULE_MANAGE, MODULE_DELETE, MODULE_CREATE_EXECUTABLES],
            ResourceKind::Action | ResourceKind::ActionCollection | ResourceKind::ModuleInstance => {
                &[ACTION_READ, ACTION_EXECUTE, ACTION_MANAGE, ACTION_DELETE]
            }
            ResourceKind::Application => &[APPLICATION_READ, APPLICATION_MANAGE, APPLICATION_DELETE],
        }
    }
}

/// Boundary entity: a named set of users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGroup {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub assigned_to_user_ids: Vec<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl PermissionGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            name: name.into(),
            assigned_to_user_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.assigned_to_user_ids.push(user_id.into());
        self
    }
}

impl HasId for PermissionGroup {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        PERMISSION_GROUPS_COLLECTION
    }
}
