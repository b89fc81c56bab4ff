//! Publish Coordinator
//!
//! Copies the draft content of a package's modules, actions and collections
//! into fresh published entities. Each entity kind has a publisher; they run
//! in order and share a [`PublishingMeta`] holding the old -> new id tables
//! the later publishers remap through.

pub mod publishable;
pub mod module_publisher;
pub mod action_publisher;
pub mod collection_publisher;

pub use publishable::{IdRemap, PackagePublishable, PublishingMeta};
pub use module_publisher::ModulePublisher;
pub use action_publisher::ActionPublisher;
pub use collection_publisher::{CollectionPublisher, PublishedCollection};
