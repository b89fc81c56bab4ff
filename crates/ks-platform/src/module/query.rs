//! Module Query Service
//!
//! Read models for editors (draft content) and consumers (published
//! content), annotated with the caller's permissions on each module.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::module::{Module, ModuleRepository, ModuleSnapshot, ModuleType};
use crate::package::PackageRepository;
use crate::permission::{permissions, PermissionGate};
use crate::shared::api_common::ResourceMode;
use crate::shared::error::Result;
use crate::usecase::ExecutionContext;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDto {
    pub id: String,
    pub module_uuid: String,
    pub package_id: String,
    pub package_uuid: String,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    pub name: String,
    pub inputs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_module_id: Option<String>,
    /// Permissions the caller holds on this module
    pub user_permissions: BTreeSet<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ModuleDto {
    fn from_snapshot(module: &Module, snapshot: &ModuleSnapshot, user_permissions: BTreeSet<String>) -> Self {
        Self {
            id: module.id.clone(),
            module_uuid: module.module_uuid.clone(),
            package_id: module.package_id.clone(),
            package_uuid: module.package_uuid.clone(),
            module_type: module.module_type,
            name: snapshot.name.clone(),
            inputs: snapshot.inputs.clone(),
            origin_module_id: module.origin_module_id.clone(),
            user_permissions,
            created_at: module.created_at.to_rfc3339(),
            updated_at: module.updated_at.to_rfc3339(),
        }
    }

    /// Draft content for draft modules, published content for published
    /// copies.
    pub fn for_caller(ctx: &ExecutionContext, module: &Module) -> Self {
        let snapshot = if module.is_published_copy() { &module.published } else { &module.draft };
        Self::from_snapshot(module, snapshot, PermissionGate::permissions_of(ctx, &module.policies))
    }
}

fn required_permission(mode: ResourceMode) -> &'static str {
    match mode {
        ResourceMode::Edit => permissions::MODULE_MANAGE,
        ResourceMode::View => permissions::MODULE_READ,
    }
}

pub struct ModuleQueryService {
    package_repo: Arc<PackageRepository>,
    module_repo: Arc<ModuleRepository>,
}

impl ModuleQueryService {
    pub fn new(package_repo: Arc<PackageRepository>, module_repo: Arc<ModuleRepository>) -> Self {
        Self { package_repo, module_repo }
    }

    pub async fn get_module(&self, ctx: &ExecutionContext, id: &str, mode: ResourceMode) -> Result<ModuleDto> {
        let module = PermissionGate::resolve(
            ctx,
            self.module_repo.find_by_id(id).await?,
            id,
            required_permission(mode),
        )?;
        Ok(ModuleDto::for_caller(ctx, &module))
    }

    /// Live modules of a package the caller may see in `mode`.
    pub async fn list_modules(
        &self,
        ctx: &ExecutionContext,
        package_id: &str,
        mode: ResourceMode,
    ) -> Result<Vec<ModuleDto>> {
        PermissionGate::resolve(
            ctx,
            self.package_repo.find_by_id(package_id).await?,
            package_id,
            permissions::PACKAGE_READ,
        )?;

        let permission = required_permission(mode);
        Ok(self.module_repo
            .find_by_package(package_id)
            .await?
            .iter()
            .filter(|m| PermissionGate::allows(ctx, &m.policies, permission))
            .map(|m| ModuleDto::for_caller(ctx, m))
            .collect())
    }

    /// Published modules of the given published packages that the caller can
    /// read. Unknown, draft or hidden packages are skipped.
    pub async fn consumable_modules(
        &self,
        ctx: &ExecutionContext,
        package_ids: &[String],
    ) -> Result<Vec<ModuleDto>> {
        let readable: Vec<String> = self.package_repo
            .find_published_by_ids(package_ids)
            .await?
            .into_iter()
            .filter(|p| PermissionGate::allows(ctx, &p.policies, permissions::PACKAGE_READ))
            .map(|p| p.id)
            .collect();

        if readable.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self.module_repo
            .find_by_packages(&readable)
            .await?
            .iter()
            .filter(|m| PermissionGate::allows(ctx, &m.policies, permissions::MODULE_READ))
            .map(|m| ModuleDto::from_snapshot(m, &m.published, PermissionGate::permissions_of(ctx, &m.policies)))
            .collect())
    }
}
