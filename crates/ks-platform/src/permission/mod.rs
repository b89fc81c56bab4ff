//! Permission Aggregate
//!
//! Permission groups, entity policies and the gate every entry point
//! checks before reading or writing an entity.

pub mod entity;
pub mod policy;
pub mod gate;
pub mod repository;

pub use entity::{permissions, PermissionGroup, Policy, ResourceKind};
pub use policy::PolicyGenerator;
pub use gate::{PermissionGate, Secured};
pub use repository::PermissionGroupRepository;
