//! Modules API
//!
//! REST endpoints for module management inside draft packages.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};

use crate::module::{ModuleDto, ModuleQueryService, ModuleType};
use crate::shared::api_common::{CreatedResponse, ModeParams, ResourceMode, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::usecase::{UnitOfWork, UseCaseResult};
use super::operations::{
    CreateModuleCommand, CreateModuleUseCase, PublicEntityDefinition,
    UpdateModuleCommand, UpdateModuleUseCase,
    DeleteModuleCommand, DeleteModuleUseCase,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleRequest {
    pub package_id: String,

    pub name: String,

    /// QUERY_MODULE (default) or JS_MODULE
    #[serde(rename = "type", default)]
    pub module_type: ModuleType,

    #[serde(default)]
    pub inputs: BTreeMap<String, String>,

    /// Public action of the module
    pub entity: Option<PublicEntityDefinition>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModuleRequest {
    pub name: Option<String>,
    pub inputs: Option<BTreeMap<String, String>>,
}

#[derive(Clone)]
pub struct ModulesState<U: UnitOfWork + 'static> {
    pub query_service: Arc<ModuleQueryService>,
    pub create_use_case: Arc<CreateModuleUseCase<U>>,
    pub update_use_case: Arc<UpdateModuleUseCase<U>>,
    pub delete_use_case: Arc<DeleteModuleUseCase<U>>,
}

/// Create a module and its public action
#[utoipa::path(
    post,
    path = "",
    tag = "modules",
    request_body = CreateModuleRequest,
    responses(
        (status = 200, description = "Module created", body = CreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Package not found"),
        (status = 409, description = "Duplicate name or published package")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_module<U: UnitOfWork>(
    State(state): State<ModulesState<U>>,
    auth: Authenticated,
    Json(req): Json<CreateModuleRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    let command = CreateModuleCommand {
        package_id: req.package_id,
        name: req.name,
        module_type: req.module_type,
        inputs: req.inputs,
        entity: req.entity,
    };

    match state.create_use_case.execute(command, auth.execution_context()).await {
        UseCaseResult::Success(event) => Ok(Json(CreatedResponse::new(event.module_id))),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Get a module
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "modules",
    params(("id" = String, Path, description = "Module ID"), ModeParams),
    responses(
        (status = 200, description = "Module found", body = ModuleDto),
        (status = 404, description = "Module not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_module<U: UnitOfWork>(
    State(state): State<ModulesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(params): Query<ModeParams>,
) -> Result<Json<ModuleDto>, PlatformError> {
    let ctx = auth.execution_context();
    let module = state.query_service.get_module(&ctx, &id, params.mode()).await?;
    Ok(Json(module))
}

/// Update a module draft
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "modules",
    params(("id" = String, Path, description = "Module ID")),
    request_body = UpdateModuleRequest,
    responses(
        (status = 200, description = "Module updated", body = ModuleDto),
        (status = 400, description = "Invalid name"),
        (status = 404, description = "Module not found"),
        (status = 409, description = "Duplicate name or published module")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_module<U: UnitOfWork>(
    State(state): State<ModulesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateModuleRequest>,
) -> Result<Json<ModuleDto>, PlatformError> {
    let command = UpdateModuleCommand {
        module_id: id.clone(),
        name: req.name,
        inputs: req.inputs,
    };

    let ctx = auth.execution_context();
    match state.update_use_case.execute(command, ctx.clone()).await {
        UseCaseResult::Success(_event) => {
            let module = state.query_service.get_module(&ctx, &id, ResourceMode::Edit).await?;
            Ok(Json(module))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Delete (archive) a module with its actions and collections
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "modules",
    params(("id" = String, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Module archived", body = SuccessResponse),
        (status = 404, description = "Module not found"),
        (status = 409, description = "Module has instances")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_module<U: UnitOfWork>(
    State(state): State<ModulesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    let command = DeleteModuleCommand { module_id: id };

    match state.delete_use_case.execute(command, auth.execution_context()).await {
        UseCaseResult::Success(_event) => Ok(Json(SuccessResponse::ok())),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// OpenAPI documentation for the modules endpoints
#[derive(OpenApi)]
#[openapi(
    paths(create_module, get_module, update_module, delete_module),
    components(schemas(
        CreateModuleRequest,
        UpdateModuleRequest,
        PublicEntityDefinition,
        ModuleDto,
        ModuleType,
        CreatedResponse,
        SuccessResponse,
    )),
    tags((name = "modules", description = "Modules of draft packages"))
)]
pub struct ModulesApi;

pub fn modules_router<U: UnitOfWork + Clone>(state: ModulesState<U>) -> Router {
    Router::new()
        .route("/", post(create_module::<U>))
        .route("/:id", get(get_module::<U>).put(update_module::<U>).delete(delete_module::<U>))
        .with_state(state)
}
