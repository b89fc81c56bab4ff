//! Publish Package Use Case
//!
//! Creates the next published version of a draft package: a new package
//! copy plus published copies of its modules, module actions and
//! collections, committed together with the source package stamp.

use std::sync::Arc;

use bson::doc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::action::ActionRepository;
use crate::action_collection::ActionCollectionRepository;
use crate::module::ModuleRepository;
use crate::package::{entity::PACKAGES_COLLECTION, PackageRepository};
use crate::permission::{permissions, PermissionGate};
use crate::publish::{
    ActionPublisher, CollectionPublisher, ModulePublisher, PackagePublishable, PublishingMeta,
};
use crate::usecase::{codes, ExecutionContext, PendingWrite, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::PackagePublished;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPackageCommand {
    pub package_id: String,
}

pub struct PublishPackageUseCase<U: UnitOfWork> {
    package_repo: Arc<PackageRepository>,
    module_publisher: ModulePublisher,
    action_publisher: ActionPublisher,
    collection_publisher: CollectionPublisher,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> PublishPackageUseCase<U> {
    pub fn new(
        package_repo: Arc<PackageRepository>,
        module_repo: Arc<ModuleRepository>,
        action_repo: Arc<ActionRepository>,
        collection_repo: Arc<ActionCollectionRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            package_repo,
            module_publisher: ModulePublisher::new(module_repo),
            action_publisher: ActionPublisher::new(action_repo.clone()),
            collection_publisher: CollectionPublisher::new(collection_repo, action_repo),
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: PublishPackageCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<PackagePublished> {
        match self.prepare(&command, &ctx).await {
            Ok((writes, event)) => self.unit_of_work.commit_all(writes, event, &command).await,
            Err(e) => UseCaseResult::failure(e),
        }
    }

    async fn prepare(
        &self,
        command: &PublishPackageCommand,
        ctx: &ExecutionContext,
    ) -> Result<(Vec<PendingWrite>, PackagePublished), UseCaseError> {
        let package = PermissionGate::resolve(
            ctx,
            self.package_repo.find_by_id(&command.package_id).await?,
            &command.package_id,
            permissions::PACKAGE_PUBLISH,
        )?;

        if package.is_published_copy() {
            return Err(UseCaseError::business_rule_with_details(
                codes::CANNOT_PUBLISH_PUBLISHED_PACKAGE,
                "A published package cannot be published again",
                crate::details! {
                    "packageId" => package.id,
                    "sourcePackageId" => package.source_package_id,
                },
            ));
        }

        let version = self.package_repo.count_versions(&package.id).await? + 1;
        let published_package = package.published_copy(version.to_string(), chrono::Utc::now());
        let mut meta = PublishingMeta::new(package, published_package);

        let modules = self.module_publisher.publishable_entities(&mut meta).await?;
        if modules.is_empty() {
            return Err(UseCaseError::business_rule_with_details(
                codes::NOTHING_TO_PUBLISH,
                "The package has no modules to publish",
                crate::details! { "packageId" => meta.source_package.id },
            ));
        }
        let actions = self.action_publisher.publishable_entities(&mut meta).await?;
        let collections = self.collection_publisher.publishable_entities(&mut meta).await?;

        let mut writes = vec![PendingWrite::upsert(&meta.published_package)?];
        writes.extend(self.module_publisher.pending_writes(&modules)?);
        writes.extend(self.action_publisher.pending_writes(&actions)?);
        writes.extend(self.collection_publisher.pending_writes(&collections)?);

        let stamped_at = bson::DateTime::from_chrono(meta.published_at);
        writes.push(PendingWrite::set_fields(
            PACKAGES_COLLECTION,
            meta.source_package.id.as_str(),
            doc! { "lastPublishedAt": stamped_at, "updatedAt": stamped_at },
        ));

        info!(
            package_id = %meta.source_package.id,
            published_package_id = %meta.published_package.id,
            version,
            modules = modules.len(),
            actions = meta.action_ids.len(),
            collections = collections.len(),
            "Publishing package"
        );

        let event = PackagePublished::new(
            ctx,
            &meta.source_package.id,
            &meta.published_package.id,
            &version.to_string(),
            modules.iter().map(|m| m.id.clone()).collect(),
            meta.action_ids.len(),
            collections.len(),
        );

        Ok((writes, event))
    }
}
