//! Execution Context
//!
//! Carries the principal, the principal's permission groups and the tracing
//! IDs through a use case execution.

use std::collections::BTreeSet;
use chrono::{DateTime, Utc};
use crate::shared::tsid::TsidGenerator;

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Unique ID for this execution (generated)
    pub execution_id: String,
    /// ID for distributed tracing (usually from original request)
    pub correlation_id: String,
    /// ID of the parent event that caused this execution (if any)
    pub causation_id: Option<String>,
    /// ID of the principal performing the action
    pub principal_id: String,
    /// Permission groups the principal belongs to; policies are checked against these
    pub permission_groups: BTreeSet<String>,
    pub initiated_at: DateTime<Utc>,
}

impl ExecutionContext {
    /// Create a context for a fresh request. The correlation ID starts as the
    /// execution ID.
    pub fn create(principal_id: impl Into<String>) -> Self {
        let exec_id = format!("exec-{}", TsidGenerator::generate());
        Self {
            execution_id: exec_id.clone(),
            correlation_id: exec_id,
            causation_id: None,
            principal_id: principal_id.into(),
            permission_groups: BTreeSet::new(),
            initiated_at: Utc::now(),
        }
    }

    /// Create a context that continues an upstream correlation ID.
    pub fn with_correlation(
        principal_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            ..Self::create(principal_id)
        }
    }

    pub fn with_permission_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permission_groups = groups.into_iter().map(Into::into).collect();
        self
    }
}
