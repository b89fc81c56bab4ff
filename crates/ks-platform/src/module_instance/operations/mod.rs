//! Module Instance Operations

pub mod events;
pub mod create;

pub use events::ModuleInstanceCreated;
pub use create::{CreateModuleInstanceCommand, CreateModuleInstanceUseCase};
