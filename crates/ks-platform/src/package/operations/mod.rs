//! Package Operations

pub mod events;
pub mod create;
pub mod publish;
pub mod delete;

pub use events::{PackageCreated, PackagePublished, PackageDeleted};
pub use create::{CreatePackageCommand, CreatePackageUseCase};
pub use publish::{PublishPackageCommand, PublishPackageUseCase};
pub use delete::{DeletePackageCommand, DeletePackageUseCase};
