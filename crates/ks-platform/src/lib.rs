//! Keystone Platform
//!
//! Backend of the low-code platform:
//! - Packages of reusable modules, with draft and published versions
//! - Actions and action collections owned by modules or applications
//! - Publishing a package into a new immutable version
//! - Importing and exporting application actions
//! - Module instances binding published modules into applications
//! - Policy-based permission checks on every entry point
//! - Offline license key verification
//! - Use Case pattern with guaranteed event and audit logging
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints
//! - `operations` - Use case operations (where applicable)

// Aggregates
pub mod package;
pub mod module;
pub mod action;
pub mod action_collection;
pub mod module_instance;
pub mod application;

// Workflows
pub mod publish;
pub mod import;

// Authentication & authorization
pub mod auth;
pub mod permission;
pub mod license;

// Events and audit trail
pub mod event;
pub mod audit;

// Shared infrastructure
pub mod shared;

// Cross-cutting concerns
pub mod usecase;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::tsid::TsidGenerator;
pub use shared::store::{DocumentStore, MongoDocumentStore};
pub use shared::memory_store::MemoryStore;

// Re-export use case infrastructure
pub use usecase::{
    UseCaseResult, UseCaseError, DomainEvent, ExecutionContext,
    UnitOfWork, MongoUnitOfWork, InMemoryUnitOfWork,
};
// Note: impl_domain_event! and details! are exported at crate root via #[macro_export]

// Re-export main entity types for convenience
pub use package::entity::Package;
pub use module::entity::{Module, ModuleSnapshot, ModuleType};
pub use action::entity::{Action, ActionContext, ActionSnapshot, DatasourceRef};
pub use action_collection::entity::{ActionCollection, CollectionSnapshot};
pub use module_instance::entity::ModuleInstance;
pub use application::entity::Application;
pub use permission::entity::{PermissionGroup, Policy, ResourceKind, permissions};
pub use event::entity::Event;
pub use audit::entity::AuditLog;

// Re-export repositories
pub use package::repository::PackageRepository;
pub use module::repository::ModuleRepository;
pub use action::repository::ActionRepository;
pub use action_collection::repository::ActionCollectionRepository;
pub use module_instance::repository::ModuleInstanceRepository;
pub use application::repository::ApplicationRepository;
pub use permission::repository::PermissionGroupRepository;

// Re-export services
pub use auth::token_service::{TokenService, TokenConfig, AccessTokenClaims};
pub use permission::{PermissionGate, PolicyGenerator};
pub use license::{License, LicenseStatus, LicenseValidator};

/// Router and state re-exports for the server binary
pub mod api {
    pub use crate::shared::middleware::{Authenticated, AppState, AuthLayer};
    pub use crate::shared::api_common::{SuccessResponse, CreatedResponse, ResourceMode, ModeParams};

    pub use crate::package::api::{packages_router, PackagesState};
    pub use crate::module::api::{modules_router, ModulesState};
    pub use crate::module_instance::api::{module_instances_router, ModuleInstancesState};
    pub use crate::import::api::{applications_router, ApplicationsState};
    pub use crate::shared::health_api::{health_router, HealthState};
    pub use crate::shared::openapi::ApiDoc;
}
