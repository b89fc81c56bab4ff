//! Update Module Use Case
//!
//! Partial update of the module draft. Only changed fields are written, as
//! dotted `$set` paths; a rename is carried over to the public action.

use std::collections::BTreeMap;
use std::sync::Arc;

use bson::{doc, Document};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::action::{entity::ACTIONS_COLLECTION, ActionRepository};
use crate::module::{entity::MODULES_COLLECTION, ModuleRepository};
use crate::permission::{permissions, PermissionGate};
use crate::shared::error::PlatformError;
use crate::shared::naming::is_valid_entity_name;
use crate::usecase::{
    codes, ExecutionContext, PendingWrite, UnitOfWork, UseCaseError, UseCaseResult,
};
use super::events::ModuleUpdated;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModuleCommand {
    pub module_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<BTreeMap<String, String>>,
}

enum Plan {
    Unchanged(ModuleUpdated),
    Write(Vec<PendingWrite>, ModuleUpdated),
}

pub struct UpdateModuleUseCase<U: UnitOfWork> {
    module_repo: Arc<ModuleRepository>,
    action_repo: Arc<ActionRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> UpdateModuleUseCase<U> {
    pub fn new(
        module_repo: Arc<ModuleRepository>,
        action_repo: Arc<ActionRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            module_repo,
            action_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: UpdateModuleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<ModuleUpdated> {
        match self.prepare(&command, &ctx).await {
            Ok(Plan::Unchanged(event)) => UseCaseResult::success(event),
            Ok(Plan::Write(writes, event)) => {
                self.unit_of_work.commit_all(writes, event, &command).await
            }
            Err(e) => UseCaseResult::failure(e),
        }
    }

    async fn prepare(
        &self,
        command: &UpdateModuleCommand,
        ctx: &ExecutionContext,
    ) -> Result<Plan, UseCaseError> {
        let module = PermissionGate::resolve(
            ctx,
            self.module_repo.find_by_id(&command.module_id).await?,
            &command.module_id,
            permissions::MODULE_MANAGE,
        )?;

        if module.is_published_copy() {
            return Err(UseCaseError::business_rule_with_details(
                codes::PUBLISHED_VERSION_READ_ONLY,
                "A published module cannot be edited",
                crate::details! {
                    "moduleId" => module.id,
                    "originModuleId" => module.origin_module_id,
                },
            ));
        }

        let mut fields = Document::new();
        let mut changed_fields = Vec::new();
        let mut new_name = None;

        if let Some(name) = command.name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(UseCaseError::validation_with_details(
                    codes::INVALID_PARAMETER,
                    "Missing or invalid parameter: name",
                    crate::details! { "parameter" => "name" },
                ));
            }

            if name != module.draft.name {
                if !is_valid_entity_name(name) {
                    return Err(UseCaseError::validation_with_details(
                        codes::INVALID_ACTION_NAME,
                        format!("'{}' is not a valid module name", name),
                        crate::details! { "name" => name },
                    ));
                }

                let clash = self.module_repo.find_by_name(&module.package_id, name).await?;
                if clash.is_some_and(|other| other.id != module.id) {
                    return Err(UseCaseError::business_rule_with_details(
                        codes::DUPLICATE_NAME,
                        format!("A module named '{}' already exists in this package", name),
                        crate::details! { "name" => name, "packageId" => module.package_id },
                    ));
                }

                fields.insert("draft.name", name);
                changed_fields.push("name".to_string());
                new_name = Some(name.to_string());
            }
        }

        if let Some(inputs) = &command.inputs {
            if inputs != &module.draft.inputs {
                let value = bson::to_bson(inputs).map_err(PlatformError::from)?;
                fields.insert("draft.inputs", value);
                changed_fields.push("inputs".to_string());
            }
        }

        let event = ModuleUpdated::new(ctx, &module.id, changed_fields, new_name.clone());
        if fields.is_empty() {
            return Ok(Plan::Unchanged(event));
        }

        let now = bson::DateTime::from_chrono(Utc::now());
        fields.insert("updatedAt", now);
        let mut writes = vec![PendingWrite::set_fields(MODULES_COLLECTION, &module.id, fields)];

        if let Some(name) = new_name {
            if let Some(public_action) = self.action_repo.find_public_action(&module.id).await? {
                writes.push(PendingWrite::set_fields(
                    ACTIONS_COLLECTION,
                    public_action.id,
                    doc! { "draft.name": name, "updatedAt": now },
                ));
            }
        }

        Ok(Plan::Write(writes, event))
    }
}
