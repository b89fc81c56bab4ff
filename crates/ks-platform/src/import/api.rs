//! Applications API
//!
//! Import and export of application actions.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::usecase::{UnitOfWork, UseCaseResult};
use super::definition::ActionDefinition;
use super::export::ExportService;
use super::import_actions::{ImportActionsCommand, ImportActionsUseCase};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportActionsRequest {
    pub actions: Vec<ActionDefinition>,

    #[serde(default)]
    pub module_instance_refs: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportActionsResponse {
    pub created: Vec<String>,
    pub updated: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportActionsResponse {
    pub application_id: String,
    pub actions: Vec<ActionDefinition>,
}

#[derive(Clone)]
pub struct ApplicationsState<U: UnitOfWork + 'static> {
    pub import_use_case: Arc<ImportActionsUseCase<U>>,
    pub export_service: Arc<ExportService>,
}

/// Import actions into an application
#[utoipa::path(
    post,
    path = "/{id}/import",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    request_body = ImportActionsRequest,
    responses(
        (status = 200, description = "Actions imported", body = ImportActionsResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Application not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn import_actions<U: UnitOfWork>(
    State(state): State<ApplicationsState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<ImportActionsRequest>,
) -> Result<Json<ImportActionsResponse>, PlatformError> {
    let command = ImportActionsCommand {
        application_id: id,
        actions: req.actions,
        module_instance_refs: req.module_instance_refs,
    };

    match state.import_use_case.execute(command, auth.execution_context()).await {
        UseCaseResult::Success(event) => Ok(Json(ImportActionsResponse {
            created: event.created_action_ids,
            updated: event.updated_action_ids,
        })),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Export the actions of an application
#[utoipa::path(
    get,
    path = "/{id}/export",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Exported actions", body = ExportActionsResponse),
        (status = 404, description = "Application not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_actions<U: UnitOfWork>(
    State(state): State<ApplicationsState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ExportActionsResponse>, PlatformError> {
    let actions = state.export_service
        .export_application(&auth.execution_context(), &id)
        .await?;

    Ok(Json(ExportActionsResponse {
        application_id: id,
        actions,
    }))
}

/// OpenAPI documentation for the application import/export endpoints
#[derive(OpenApi)]
#[openapi(
    paths(import_actions, export_actions),
    components(schemas(
        ImportActionsRequest,
        ImportActionsResponse,
        ExportActionsResponse,
        ActionDefinition,
    )),
    tags((name = "applications", description = "Action import and export"))
)]
pub struct ApplicationsApi;

pub fn applications_router<U: UnitOfWork + Clone>(state: ApplicationsState<U>) -> Router {
    Router::new()
        .route("/:id/import", post(import_actions::<U>))
        .route("/:id/export", get(export_actions::<U>))
        .with_state(state)
}
