//! Action Collection Aggregate
//!
//! JS objects grouping JS actions. A collection references its actions by
//! id, so publishing must remap those references to the published actions.

pub mod entity;
pub mod repository;

pub use entity::{ActionCollection, CollectionSnapshot};
pub use repository::ActionCollectionRepository;
