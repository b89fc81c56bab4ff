//! Module Aggregate
//!
//! Modules of a package: creation with their hidden public action, partial
//! draft updates, cascading archive, and the read models served to editors
//! and consumers.

pub mod entity;
pub mod repository;
pub mod query;
pub mod api;
pub mod operations;

pub use entity::{Module, ModuleSnapshot, ModuleType};
pub use repository::ModuleRepository;
pub use query::{ModuleDto, ModuleQueryService};
pub use api::{ModulesState, modules_router};
