//! Module Operations
//!
//! Use cases for module management following the Command pattern with
//! guaranteed event emission and audit logging through UnitOfWork.

pub mod events;
pub mod create;
pub mod update;
pub mod delete;
pub mod archive;

pub use events::{ModuleCreated, ModuleUpdated, ModuleDeleted};
pub use create::{CreateModuleCommand, CreateModuleUseCase, PublicEntityDefinition};
pub use update::{UpdateModuleCommand, UpdateModuleUseCase};
pub use delete::{DeleteModuleCommand, DeleteModuleUseCase};
pub use archive::{ModuleArchivePlan, ensure_no_instances, archive_fields};
