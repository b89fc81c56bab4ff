//! Module Instance Aggregate
//!
//! Binds a published module into an application.

pub mod entity;
pub mod repository;
pub mod api;
pub mod operations;

pub use entity::ModuleInstance;
pub use repository::ModuleInstanceRepository;
pub use api::{ModuleInstancesState, module_instances_router};
