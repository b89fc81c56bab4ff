//! Import Coordinator
//!
//! Merges externally supplied action definitions into an application and
//! produces the sanitized definitions an export hands out.

pub mod definition;
pub mod events;
pub mod matcher;
pub mod import_actions;
pub mod export;
pub mod api;

pub use definition::ActionDefinition;
pub use events::ActionsImported;
pub use matcher::ImportMatcher;
pub use import_actions::{ImportActionsCommand, ImportActionsUseCase};
pub use export::ExportService;
pub use api::{ApplicationsState, applications_router};
