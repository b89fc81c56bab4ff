//! Delete Package Use Case
//!
//! Archives a draft or published package together with its modules and
//! everything they own.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::action::ActionRepository;
use crate::action_collection::ActionCollectionRepository;
use crate::module::operations::{archive_fields, ensure_no_instances, ModuleArchivePlan};
use crate::module::ModuleRepository;
use crate::module_instance::ModuleInstanceRepository;
use crate::package::{entity::PACKAGES_COLLECTION, PackageRepository};
use crate::permission::{permissions, PermissionGate};
use crate::usecase::{ExecutionContext, PendingWrite, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::PackageDeleted;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePackageCommand {
    pub package_id: String,
}

pub struct DeletePackageUseCase<U: UnitOfWork> {
    package_repo: Arc<PackageRepository>,
    module_repo: Arc<ModuleRepository>,
    action_repo: Arc<ActionRepository>,
    collection_repo: Arc<ActionCollectionRepository>,
    instance_repo: Arc<ModuleInstanceRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> DeletePackageUseCase<U> {
    pub fn new(
        package_repo: Arc<PackageRepository>,
        module_repo: Arc<ModuleRepository>,
        action_repo: Arc<ActionRepository>,
        collection_repo: Arc<ActionCollectionRepository>,
        instance_repo: Arc<ModuleInstanceRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            package_repo,
            module_repo,
            action_repo,
            collection_repo,
            instance_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: DeletePackageCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<PackageDeleted> {
        match self.prepare(&command, &ctx).await {
            Ok((writes, event)) => self.unit_of_work.commit_all(writes, event, &command).await,
            Err(e) => UseCaseResult::failure(e),
        }
    }

    async fn prepare(
        &self,
        command: &DeletePackageCommand,
        ctx: &ExecutionContext,
    ) -> Result<(Vec<PendingWrite>, PackageDeleted), UseCaseError> {
        let package = PermissionGate::resolve(
            ctx,
            self.package_repo.find_by_id(&command.package_id).await?,
            &command.package_id,
            permissions::PACKAGE_DELETE,
        )?;

        let modules = self.module_repo.find_by_package(&package.id).await?;
        ensure_no_instances(&modules, &self.module_repo, &self.instance_repo).await?;

        let plan = ModuleArchivePlan::build(&modules, &self.action_repo, &self.collection_repo).await?;

        let mut writes = plan.writes();
        writes.push(PendingWrite::set_fields(
            PACKAGES_COLLECTION,
            package.id.as_str(),
            archive_fields(Utc::now()),
        ));

        let event = PackageDeleted::new(ctx, &package.id, plan.module_ids.clone());
        Ok((writes, event))
    }
}
