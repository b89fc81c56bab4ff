//! Feature Flags

/// Runtime feature switches, set from configuration at startup.
#[derive(Debug, Clone, Copy)]
pub struct FeatureFlags {
    /// Gates creation of query modules.
    pub query_modules: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self { query_modules: true }
    }
}
