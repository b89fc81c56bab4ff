//! Module Instances API

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};

use crate::shared::api_common::CreatedResponse;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::usecase::{UnitOfWork, UseCaseResult};
use super::operations::{CreateModuleInstanceCommand, CreateModuleInstanceUseCase};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleInstanceRequest {
    /// Published module to instantiate
    pub module_id: String,
    pub application_id: String,
    pub name: String,
}

#[derive(Clone)]
pub struct ModuleInstancesState<U: UnitOfWork + 'static> {
    pub create_use_case: Arc<CreateModuleInstanceUseCase<U>>,
}

/// Instantiate a published module into an application
#[utoipa::path(
    post,
    path = "",
    tag = "module-instances",
    request_body = CreateModuleInstanceRequest,
    responses(
        (status = 200, description = "Module instance created", body = CreatedResponse),
        (status = 404, description = "Module or application not found"),
        (status = 409, description = "Module has no published content")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_module_instance<U: UnitOfWork>(
    State(state): State<ModuleInstancesState<U>>,
    auth: Authenticated,
    Json(req): Json<CreateModuleInstanceRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    let command = CreateModuleInstanceCommand {
        module_id: req.module_id,
        application_id: req.application_id,
        name: req.name,
    };

    match state.create_use_case.execute(command, auth.execution_context()).await {
        UseCaseResult::Success(event) => Ok(Json(CreatedResponse::new(event.module_instance_id))),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// OpenAPI documentation for the module instance endpoints
#[derive(OpenApi)]
#[openapi(
    paths(create_module_instance),
    components(schemas(CreateModuleInstanceRequest, CreatedResponse)),
    tags((name = "module-instances", description = "Published modules bound into applications"))
)]
pub struct ModuleInstancesApi;

pub fn module_instances_router<U: UnitOfWork + Clone>(state: ModuleInstancesState<U>) -> Router {
    Router::new()
        .route("/", post(create_module_instance::<U>))
        .with_state(state)
}
