//! Shared Module
//!
//! Cross-cutting concerns and shared utilities.

pub mod error;
pub mod tsid;
pub mod store;
pub mod memory_store;
pub mod naming;
pub mod features;
pub mod middleware;
pub mod api_common;
pub mod indexes;
pub mod openapi;

// APIs
pub mod health_api;

// Re-export commonly used items
pub use error::{PlatformError, Result};
pub use tsid::TsidGenerator;
pub use store::{DocumentStore, EntityCollection, MongoDocumentStore};
pub use memory_store::MemoryStore;
pub use features::FeatureFlags;
pub use middleware::{Authenticated, AppState, AuthLayer};
pub use api_common::{SuccessResponse, CreatedResponse, ResourceMode};
pub use health_api::health_router;
pub use openapi::ApiDoc;
