//! Application export

use std::sync::Arc;

use crate::action::ActionRepository;
use crate::application::ApplicationRepository;
use crate::permission::{permissions, PermissionGate};
use crate::shared::error::Result;
use crate::usecase::ExecutionContext;
use super::definition::ActionDefinition;

pub struct ExportService {
    application_repo: Arc<ApplicationRepository>,
    action_repo: Arc<ActionRepository>,
}

impl ExportService {
    pub fn new(application_repo: Arc<ApplicationRepository>, action_repo: Arc<ActionRepository>) -> Self {
        Self { application_repo, action_repo }
    }

    /// Live actions of an application as portable definitions.
    pub async fn export_application(
        &self,
        ctx: &ExecutionContext,
        application_id: &str,
    ) -> Result<Vec<ActionDefinition>> {
        let application = PermissionGate::resolve(
            ctx,
            self.application_repo.find_by_id(application_id).await?,
            application_id,
            permissions::APPLICATION_READ,
        )?;

        Ok(self.action_repo
            .find_by_application(&application.id)
            .await?
            .iter()
            .map(ActionDefinition::from)
            .collect())
    }
}
