//! Create Package Use Case

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::package::{Package, PackageRepository};
use crate::permission::{PolicyGenerator, ResourceKind};
use crate::usecase::{codes, ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::PackageCreated;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageCommand {
    pub name: String,
    pub workspace_id: String,
}

pub struct CreatePackageUseCase<U: UnitOfWork> {
    package_repo: Arc<PackageRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> CreatePackageUseCase<U> {
    pub fn new(package_repo: Arc<PackageRepository>, unit_of_work: Arc<U>) -> Self {
        Self { package_repo, unit_of_work }
    }

    pub async fn execute(
        &self,
        command: CreatePackageCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<PackageCreated> {
        match self.prepare(&command, &ctx).await {
            Ok((package, event)) => self.unit_of_work.commit(&package, event, &command).await,
            Err(e) => UseCaseResult::failure(e),
        }
    }

    async fn prepare(
        &self,
        command: &CreatePackageCommand,
        ctx: &ExecutionContext,
    ) -> Result<(Package, PackageCreated), UseCaseError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(UseCaseError::validation(codes::INVALID_PARAMETER, "name is required"));
        }

        let workspace_id = command.workspace_id.trim();
        if workspace_id.is_empty() {
            return Err(UseCaseError::validation(codes::INVALID_PARAMETER, "workspaceId is required"));
        }

        if self.package_repo.find_draft_by_name(workspace_id, name).await?.is_some() {
            return Err(UseCaseError::business_rule_with_details(
                codes::DUPLICATE_NAME,
                format!("A package named '{}' already exists in this workspace", name),
                crate::details! { "name" => name, "workspaceId" => workspace_id },
            ));
        }

        let package = Package::new(
            name,
            workspace_id,
            PolicyGenerator::owner_policies(ResourceKind::Package, &ctx.permission_groups),
        );
        let event = PackageCreated::new(ctx, &package.id, name, workspace_id);

        Ok((package, event))
    }
}
