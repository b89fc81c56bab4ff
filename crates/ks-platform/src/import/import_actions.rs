//! Import Actions Use Case

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::{Action, ActionRepository};
use crate::application::ApplicationRepository;
use crate::permission::{permissions, PermissionGate, PolicyGenerator, ResourceKind};
use crate::usecase::{codes, ExecutionContext, PendingWrite, UnitOfWork, UseCaseError, UseCaseResult};
use super::definition::ActionDefinition;
use super::events::ActionsImported;
use super::matcher::ImportMatcher;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportActionsCommand {
    pub application_id: String,

    pub actions: Vec<ActionDefinition>,

    /// Module instance id in the source -> module instance id in the target
    #[serde(default)]
    pub module_instance_refs: BTreeMap<String, String>,
}

pub struct ImportActionsUseCase<U: UnitOfWork> {
    application_repo: Arc<ApplicationRepository>,
    action_repo: Arc<ActionRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> ImportActionsUseCase<U> {
    pub fn new(
        application_repo: Arc<ApplicationRepository>,
        action_repo: Arc<ActionRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            application_repo,
            action_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: ImportActionsCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<ActionsImported> {
        match self.prepare(&command, &ctx).await {
            Ok((writes, event)) => self.unit_of_work.commit_all(writes, event, &command).await,
            Err(e) => UseCaseResult::failure(e),
        }
    }

    async fn prepare(
        &self,
        command: &ImportActionsCommand,
        ctx: &ExecutionContext,
    ) -> Result<(Vec<PendingWrite>, ActionsImported), UseCaseError> {
        if command.actions.is_empty() {
            return Err(UseCaseError::validation(codes::INVALID_PARAMETER, "actions is required"));
        }

        let application = PermissionGate::resolve(
            ctx,
            self.application_repo.find_by_id(&command.application_id).await?,
            &command.application_id,
            permissions::APPLICATION_MANAGE,
        )?;

        let candidates = self.action_repo.find_import_candidates(&application.id).await?;
        let mut matcher = ImportMatcher::new(&candidates);
        let new_action_policies = PolicyGenerator::child_policies(&application.policies, ResourceKind::Action);
        let now = Utc::now();

        let mut writes = Vec::with_capacity(command.actions.len());
        let mut created = Vec::new();
        let mut updated = Vec::new();

        for definition in &command.actions {
            let incoming = remap_instance_refs(definition, &command.module_instance_refs);

            let mut draft = incoming.action.clone();
            if incoming.is_public {
                draft.regenerate_datasource();
            }

            let action = match matcher.claim(&incoming) {
                Some(existing) => {
                    debug!(action_id = %existing.id, name = incoming.name(), "Import updates existing action");
                    updated.push(existing.id.clone());
                    Action {
                        draft,
                        updated_at: now,
                        ..existing.clone()
                    }
                }
                None => {
                    let mut action = Action::new(draft, new_action_policies.clone())
                        .in_application(application.id.as_str());
                    action.is_public = incoming.is_public;
                    action.collection_id = incoming.collection_id;
                    action.module_instance_id = incoming.module_instance_id;
                    action.root_module_instance_id = incoming.root_module_instance_id;
                    created.push(action.id.clone());
                    action
                }
            };

            writes.push(PendingWrite::upsert(&action)?);
        }

        let event = ActionsImported::new(ctx, &application.id, created, updated);
        Ok((writes, event))
    }
}

/// Public definitions refer to module instances of the exporting side;
/// point them at the target's instances.
fn remap_instance_refs(definition: &ActionDefinition, refs: &BTreeMap<String, String>) -> ActionDefinition {
    let mut incoming = definition.clone();
    if !incoming.is_public {
        return incoming;
    }

    // A ref the target application does not know resolves to no instance.
    let remap = |id: Option<String>| id.and_then(|id| refs.get(&id).cloned());
    incoming.module_instance_id = remap(incoming.module_instance_id.take());
    incoming.root_module_instance_id = remap(incoming.root_module_instance_id.take());
    incoming
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_only_touches_public_definitions() {
        let refs = BTreeMap::from([("src-mi".to_string(), "dst-mi".to_string())]);

        let mut public = ActionDefinition::named("main");
        public.is_public = true;
        public.module_instance_id = Some("src-mi".to_string());
        public.root_module_instance_id = Some("unknown".to_string());

        let remapped = remap_instance_refs(&public, &refs);
        assert_eq!(remapped.module_instance_id.as_deref(), Some("dst-mi"));
        assert_eq!(remapped.root_module_instance_id, None);

        let mut private = ActionDefinition::named("run");
        private.module_instance_id = Some("src-mi".to_string());
        assert_eq!(remap_instance_refs(&private, &refs).module_instance_id.as_deref(), Some("src-mi"));
    }
}
