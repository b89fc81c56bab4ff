//! Auth Context
//!
//! The authenticated principal and its permission groups, resolved once per
//! request.

use std::collections::BTreeSet;

use crate::usecase::ExecutionContext;

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal_id: String,
    pub permission_groups: BTreeSet<String>,
    /// Upstream correlation ID from the `x-correlation-id` header
    pub correlation_id: Option<String>,
}

impl AuthContext {
    pub fn new(principal_id: impl Into<String>, permission_groups: BTreeSet<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            permission_groups,
            correlation_id: None,
        }
    }

    /// Execution context for one use case run on behalf of this principal.
    pub fn execution_context(&self) -> ExecutionContext {
        let ctx = match &self.correlation_id {
            Some(correlation_id) => {
                ExecutionContext::with_correlation(&self.principal_id, correlation_id)
            }
            None => ExecutionContext::create(&self.principal_id),
        };
        ctx.with_permission_groups(self.permission_groups.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_context_carries_groups_and_correlation() {
        let mut auth = AuthContext::new("user-1", ["devs".to_string()].into());
        auth.correlation_id = Some("corr-1".to_string());

        let ctx = auth.execution_context();
        assert_eq!(ctx.principal_id, "user-1");
        assert_eq!(ctx.correlation_id, "corr-1");
        assert!(ctx.permission_groups.contains("devs"));
    }
}
