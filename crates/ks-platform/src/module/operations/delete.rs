//! Delete Module Use Case

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::ActionRepository;
use crate::action_collection::ActionCollectionRepository;
use crate::module::ModuleRepository;
use crate::module_instance::ModuleInstanceRepository;
use crate::permission::{permissions, PermissionGate};
use crate::usecase::{ExecutionContext, PendingWrite, UnitOfWork, UseCaseError, UseCaseResult};
use super::archive::{ensure_no_instances, ModuleArchivePlan};
use super::events::ModuleDeleted;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteModuleCommand {
    pub module_id: String,
}

pub struct DeleteModuleUseCase<U: UnitOfWork> {
    module_repo: Arc<ModuleRepository>,
    action_repo: Arc<ActionRepository>,
    collection_repo: Arc<ActionCollectionRepository>,
    instance_repo: Arc<ModuleInstanceRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> DeleteModuleUseCase<U> {
    pub fn new(
        module_repo: Arc<ModuleRepository>,
        action_repo: Arc<ActionRepository>,
        collection_repo: Arc<ActionCollectionRepository>,
        instance_repo: Arc<ModuleInstanceRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            module_repo,
            action_repo,
            collection_repo,
            instance_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: DeleteModuleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<ModuleDeleted> {
        match self.prepare(&command, &ctx).await {
            Ok((writes, event)) => self.unit_of_work.commit_all(writes, event, &command).await,
            Err(e) => UseCaseResult::failure(e),
        }
    }

    async fn prepare(
        &self,
        command: &DeleteModuleCommand,
        ctx: &ExecutionContext,
    ) -> Result<(Vec<PendingWrite>, ModuleDeleted), UseCaseError> {
        let module = PermissionGate::resolve(
            ctx,
            self.module_repo.find_by_id(&command.module_id).await?,
            &command.module_id,
            permissions::MODULE_DELETE,
        )?;

        let modules = [module];
        ensure_no_instances(&modules, &self.module_repo, &self.instance_repo).await?;

        let plan = ModuleArchivePlan::build(&modules, &self.action_repo, &self.collection_repo).await?;
        let event = ModuleDeleted::new(
            ctx,
            &modules[0].id,
            plan.action_ids.clone(),
            plan.collection_ids.clone(),
        );

        Ok((plan.writes(), event))
    }
}
