//! Package Aggregate
//!
//! Draft packages and their published versions.

pub mod entity;
pub mod repository;
pub mod query;
pub mod api;
pub mod operations;

pub use entity::Package;
pub use repository::PackageRepository;
pub use query::{PackageDto, PackageQueryService};
pub use api::{PackagesState, packages_router};
