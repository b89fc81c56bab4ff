//! Permission Gate
//!
//! Evaluates the caller's permission groups against an entity's policies.
//! A denied check is reported exactly like a missing entity, so callers
//! cannot discover ids they are not allowed to see.

use std::collections::BTreeSet;

use tracing::debug;

use super::entity::Policy;
use crate::usecase::{ExecutionContext, HasId, UseCaseError};

/// An entity guarded by policies.
pub trait Secured: HasId {
    /// Resource name used in not-found errors, e.g. "module".
    const RESOURCE: &'static str;

    fn policies(&self) -> &[Policy];

    /// Archived entities are invisible to every read path.
    fn is_archived(&self) -> bool {
        false
    }
}

pub struct PermissionGate;

impl PermissionGate {
    pub fn allows(ctx: &ExecutionContext, policies: &[Policy], permission: &str) -> bool {
        policies.iter().any(|policy| {
            policy.permission == permission
                && !policy.permission_groups.is_disjoint(&ctx.permission_groups)
        })
    }

    /// Permissions the caller holds through `policies`.
    pub fn permissions_of(ctx: &ExecutionContext, policies: &[Policy]) -> BTreeSet<String> {
        policies
            .iter()
            .filter(|policy| !policy.permission_groups.is_disjoint(&ctx.permission_groups))
            .map(|policy| policy.permission.clone())
            .collect()
    }

    pub fn require<T: Secured>(
        ctx: &ExecutionContext,
        entity: &T,
        permission: &str,
    ) -> Result<(), UseCaseError> {
        if !entity.is_archived() && Self::allows(ctx, entity.policies(), permission) {
            return Ok(());
        }

        debug!(
            principal_id = %ctx.principal_id,
            resource = T::RESOURCE,
            id = entity.id(),
            permission,
            "Permission check failed"
        );
        Err(UseCaseError::no_resource_found(T::RESOURCE, entity.id()))
    }

    /// Turn a repository lookup into a visible entity, or not found.
    pub fn resolve<T: Secured>(
        ctx: &ExecutionContext,
        found: Option<T>,
        id: &str,
        permission: &str,
    ) -> Result<T, UseCaseError> {
        let entity = found.ok_or_else(|| UseCaseError::no_resource_found(T::RESOURCE, id))?;
        Self::require(ctx, &entity, permission)?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::codes;

    struct Doc {
        id: String,
        policies: Vec<Policy>,
        archived: bool,
    }

    impl HasId for Doc {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_name() -> &'static str {
            "docs"
        }
    }

    impl Secured for Doc {
        const RESOURCE: &'static str = "doc";

        fn policies(&self) -> &[Policy] {
            &self.policies
        }

        fn is_archived(&self) -> bool {
            self.archived
        }
    }

    fn doc(archived: bool) -> Doc {
        Doc {
            id: "d-1".to_string(),
            policies: vec![
                Policy::new("doc:read", ["readers", "writers"]),
                Policy::new("doc:write", ["writers"]),
            ],
            archived,
        }
    }

    #[test]
    fn test_allows_by_group_membership() {
        let reader = ExecutionContext::create("u1").with_permission_groups(["readers"]);
        let d = doc(false);
        assert!(PermissionGate::allows(&reader, &d.policies, "doc:read"));
        assert!(!PermissionGate::allows(&reader, &d.policies, "doc:write"));
    }

    #[test]
    fn test_denial_looks_like_not_found() {
        let outsider = ExecutionContext::create("u2");
        let err = PermissionGate::require(&outsider, &doc(false), "doc:read").unwrap_err();
        assert_eq!(err.code(), codes::ACL_NO_RESOURCE_FOUND);
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_archived_entity_is_hidden() {
        let writer = ExecutionContext::create("u3").with_permission_groups(["writers"]);
        assert!(PermissionGate::require(&writer, &doc(true), "doc:read").is_err());
        assert!(PermissionGate::resolve(&writer, None::<Doc>, "d-9", "doc:read").is_err());
    }

    #[test]
    fn test_permissions_of() {
        let writer = ExecutionContext::create("u3").with_permission_groups(["writers"]);
        let held = PermissionGate::permissions_of(&writer, &doc(false).policies);
        assert_eq!(held.len(), 2);
    }
}
