//! Create Module Instance Use Case

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::ApplicationRepository;
use crate::module::ModuleRepository;
use crate::module_instance::ModuleInstance;
use crate::permission::{permissions, PermissionGate, PolicyGenerator, ResourceKind};
use crate::shared::naming::is_valid_entity_name;
use crate::usecase::{codes, ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::ModuleInstanceCreated;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleInstanceCommand {
    /// Published module to instantiate
    pub module_id: String,
    pub application_id: String,
    pub name: String,
}

pub struct CreateModuleInstanceUseCase<U: UnitOfWork> {
    module_repo: Arc<ModuleRepository>,
    application_repo: Arc<ApplicationRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> CreateModuleInstanceUseCase<U> {
    pub fn new(
        module_repo: Arc<ModuleRepository>,
        application_repo: Arc<ApplicationRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            module_repo,
            application_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: CreateModuleInstanceCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<ModuleInstanceCreated> {
        match self.prepare(&command, &ctx).await {
            Ok((instance, event)) => self.unit_of_work.commit(&instance, event, &command).await,
            Err(e) => UseCaseResult::failure(e),
        }
    }

    async fn prepare(
        &self,
        command: &CreateModuleInstanceCommand,
        ctx: &ExecutionContext,
    ) -> Result<(ModuleInstance, ModuleInstanceCreated), UseCaseError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(UseCaseError::validation_with_details(
                codes::INVALID_PARAMETER,
                "Module instance name is required",
                crate::details! { "parameter" => "name" },
            ));
        }
        if !is_valid_entity_name(name) {
            return Err(UseCaseError::validation(
                codes::INVALID_ACTION_NAME,
                format!("'{}' is not a valid name", name),
            ));
        }

        let application = PermissionGate::resolve(
            ctx,
            self.application_repo.find_by_id(&command.application_id).await?,
            &command.application_id,
            permissions::APPLICATION_MANAGE,
        )?;

        let module = PermissionGate::resolve(
            ctx,
            self.module_repo.find_by_id(&command.module_id).await?,
            &command.module_id,
            permissions::MODULE_READ,
        )?;

        if module.published.is_empty() {
            return Err(UseCaseError::business_rule_with_details(
                codes::MODULE_NOT_PUBLISHED,
                "Only published modules can be instantiated",
                crate::details! { "moduleId" => module.id },
            ));
        }

        let policies = PolicyGenerator::child_policies(&application.policies, ResourceKind::ModuleInstance);
        let instance = ModuleInstance::new(&module.id, &application.id, name, policies);

        let event = ModuleInstanceCreated::new(
            ctx,
            &instance.id,
            &module.id,
            &application.id,
            &instance.name,
        );

        Ok((instance, event))
    }
}
