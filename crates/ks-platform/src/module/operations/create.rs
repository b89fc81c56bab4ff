//! Create Module Use Case

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::action::{Action, ActionContext, ActionSnapshot, DatasourceRef};
use crate::module::{Module, ModuleRepository, ModuleSnapshot, ModuleType};
use crate::package::PackageRepository;
use crate::permission::{permissions, PermissionGate, PolicyGenerator, ResourceKind};
use crate::shared::features::FeatureFlags;
use crate::shared::naming::is_valid_entity_name;
use crate::usecase::{
    codes, ExecutionContext, PendingWrite, UnitOfWork, UseCaseError, UseCaseResult,
};
use super::events::ModuleCreated;

/// Body of the public action that exposes the module to its consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicEntityDefinition {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub datasource: Option<DatasourceRef>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub body: Option<String>,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub configuration: serde_json::Value,

    #[serde(default)]
    pub execute_on_load: bool,
}

/// Command for creating a module inside a draft package.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleCommand {
    pub package_id: String,

    pub name: String,

    #[serde(rename = "type", default)]
    pub module_type: ModuleType,

    #[serde(default)]
    pub inputs: BTreeMap<String, String>,

    /// Public action payload; required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<PublicEntityDefinition>,
}

pub struct CreateModuleUseCase<U: UnitOfWork> {
    package_repo: Arc<PackageRepository>,
    module_repo: Arc<ModuleRepository>,
    features: FeatureFlags,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> CreateModuleUseCase<U> {
    pub fn new(
        package_repo: Arc<PackageRepository>,
        module_repo: Arc<ModuleRepository>,
        features: FeatureFlags,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            package_repo,
            module_repo,
            features,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: CreateModuleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<ModuleCreated> {
        match self.prepare(&command, &ctx).await {
            Ok((writes, event)) => self.unit_of_work.commit_all(writes, event, &command).await,
            Err(e) => UseCaseResult::failure(e),
        }
    }

    /// Validate in order, then build the module and its public action.
    async fn prepare(
        &self,
        command: &CreateModuleCommand,
        ctx: &ExecutionContext,
    ) -> Result<(Vec<PendingWrite>, ModuleCreated), UseCaseError> {
        if command.module_type == ModuleType::QueryModule && !self.features.query_modules {
            return Err(UseCaseError::validation(
                codes::FEATURE_DISABLED,
                "Query modules are not enabled",
            ));
        }

        let package_id = command.package_id.trim();
        if package_id.is_empty() {
            return Err(missing_parameter("packageId"));
        }

        let name = command.name.trim();
        if name.is_empty() {
            return Err(missing_parameter("name"));
        }

        if !is_valid_entity_name(name) {
            return Err(UseCaseError::validation_with_details(
                codes::INVALID_ACTION_NAME,
                format!("'{}' is not a valid module name", name),
                crate::details! { "name" => name },
            ));
        }

        let Some(entity) = &command.entity else {
            return Err(missing_parameter("entity"));
        };

        let package = PermissionGate::resolve(
            ctx,
            self.package_repo.find_by_id(package_id).await?,
            package_id,
            permissions::PACKAGE_MANAGE,
        )?;

        if package.is_published_copy() {
            return Err(UseCaseError::business_rule_with_details(
                codes::PUBLISHED_VERSION_READ_ONLY,
                "Modules can only be added to a draft package",
                crate::details! {
                    "packageId" => package.id,
                    "sourcePackageId" => package.source_package_id,
                },
            ));
        }

        if self.module_repo.find_by_name(&package.id, name).await?.is_some() {
            return Err(UseCaseError::business_rule_with_details(
                codes::DUPLICATE_NAME,
                format!("A module named '{}' already exists in this package", name),
                crate::details! { "name" => name, "packageId" => package.id },
            ));
        }

        let module = Module::new(
            &package,
            command.module_type,
            ModuleSnapshot::new(name, command.inputs.clone()),
            PolicyGenerator::child_policies(&package.policies, ResourceKind::Module),
        );

        let public_action = Action::new(
            ActionSnapshot {
                name: name.to_string(),
                fully_qualified_name: None,
                context: ActionContext::Module,
                datasource: entity.datasource.clone(),
                body: entity.body.clone(),
                configuration: entity.configuration.clone(),
                execute_on_load: entity.execute_on_load,
            },
            PolicyGenerator::child_policies(&module.policies, ResourceKind::Action),
        )
        .in_module(&module.id)
        .public();

        let event = ModuleCreated::new(
            ctx,
            &module.id,
            &package.id,
            name,
            module.module_type,
            &public_action.id,
        );

        let writes = vec![
            PendingWrite::upsert(&module)?,
            PendingWrite::upsert(&public_action)?,
        ];

        Ok((writes, event))
    }
}

fn missing_parameter(parameter: &str) -> UseCaseError {
    UseCaseError::validation_with_details(
        codes::INVALID_PARAMETER,
        format!("Missing or invalid parameter: {}", parameter),
        crate::details! { "parameter" => parameter },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_defaults() {
        let cmd: CreateModuleCommand = serde_json::from_str(
            r#"{"packageId":"p-1","name":"orders","entity":{"body":"select 1"}}"#,
        ).unwrap();

        assert_eq!(cmd.module_type, ModuleType::QueryModule);
        assert!(cmd.inputs.is_empty());
        assert_eq!(cmd.entity.unwrap().body.as_deref(), Some("select 1"));
    }
}
