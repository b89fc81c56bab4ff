//! Package read model

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::package::{Package, PackageRepository};
use crate::permission::{permissions, PermissionGate};
use crate::shared::error::Result;
use crate::usecase::ExecutionContext;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageDto {
    pub id: String,
    pub package_uuid: String,
    pub name: String,
    pub workspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_package_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_published_at: Option<String>,
    pub user_permissions: BTreeSet<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PackageDto {
    pub fn for_caller(ctx: &ExecutionContext, package: &Package) -> Self {
        Self {
            id: package.id.clone(),
            package_uuid: package.package_uuid.clone(),
            name: package.name.clone(),
            workspace_id: package.workspace_id.clone(),
            version: package.version.clone(),
            source_package_id: package.source_package_id.clone(),
            last_published_at: package.last_published_at.map(|t| t.to_rfc3339()),
            user_permissions: PermissionGate::permissions_of(ctx, &package.policies),
            created_at: package.created_at.to_rfc3339(),
            updated_at: package.updated_at.to_rfc3339(),
        }
    }
}

pub struct PackageQueryService {
    package_repo: Arc<PackageRepository>,
}

impl PackageQueryService {
    pub fn new(package_repo: Arc<PackageRepository>) -> Self {
        Self { package_repo }
    }

    pub async fn get_package(&self, ctx: &ExecutionContext, id: &str) -> Result<PackageDto> {
        let package = PermissionGate::resolve(
            ctx,
            self.package_repo.find_by_id(id).await?,
            id,
            permissions::PACKAGE_READ,
        )?;
        Ok(PackageDto::for_caller(ctx, &package))
    }
}
