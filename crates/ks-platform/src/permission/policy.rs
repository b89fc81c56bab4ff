//! Policy Generation
//!
//! Child entities inherit access from their parent through a fixed lineage:
//! each parent permission maps to the child permissions it implies.

use std::collections::{BTreeMap, BTreeSet};

use super::entity::{permissions::*, Policy, ResourceKind};

/// Parent permission -> child permissions it grants.
const LINEAGE: &[(&str, &[&str])] = &[
    (PACKAGE_MANAGE, &[MODULE_MANAGE, MODULE_CREATE_EXECUTABLES]),
    (PACKAGE_READ, &[MODULE_READ]),
    (PACKAGE_DELETE, &[MODULE_DELETE]),
    (MODULE_MANAGE, &[ACTION_MANAGE]),
    (MODULE_READ, &[ACTION_READ, ACTION_EXECUTE]),
    (MODULE_DELETE, &[ACTION_DELETE]),
    (APPLICATION_MANAGE, &[ACTION_MANAGE]),
    (APPLICATION_READ, &[ACTION_READ, ACTION_EXECUTE]),
    (APPLICATION_DELETE, &[ACTION_DELETE]),
];

pub struct PolicyGenerator;

impl PolicyGenerator {
    /// Policies a `child` entity inherits from its parent's policies.
    /// Groups granted the same child permission by several parent
    /// permissions are merged into one policy.
    pub fn child_policies(parent_policies: &[Policy], child: ResourceKind) -> Vec<Policy> {
        let prefix = child.permission_prefix();
        let mut merged: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();

        for policy in parent_policies {
            let Some((_, granted)) = LINEAGE.iter().find(|(p, _)| *p == policy.permission) else {
                continue;
            };
            for permission in granted.iter().filter(|p| p.split(':').next() == Some(prefix)) {
                merged
                    .entry(*permission)
                    .or_default()
                    .extend(policy.permission_groups.iter().cloned());
            }
        }

        merged
            .into_iter()
            .filter(|(_, groups)| !groups.is_empty())
            .map(|(permission, groups)| Policy {
                permission: permission.to_string(),
                permission_groups: groups,
            })
            .collect()
    }

    /// Every permission of `kind`, granted to `groups`. Used for entities
    /// created at the top of a lineage, such as packages.
    pub fn owner_policies(kind: ResourceKind, groups: &BTreeSet<String>) -> Vec<Policy> {
        kind.permissions()
            .iter()
            .map(|permission| Policy {
                permission: permission.to_string(),
                permission_groups: groups.clone(),
            })
            .collect()
    }
}
