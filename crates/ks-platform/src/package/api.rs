//! Packages API
//!
//! REST endpoints for package lifecycle, publishing and module listings.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::module::{ModuleDto, ModuleQueryService};
use crate::package::{PackageDto, PackageQueryService};
use crate::shared::api_common::{split_csv, CreatedResponse, ModeParams, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::usecase::{UnitOfWork, UseCaseResult};
use super::operations::{
    CreatePackageCommand, CreatePackageUseCase,
    DeletePackageCommand, DeletePackageUseCase,
    PublishPackageCommand, PublishPackageUseCase,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageRequest {
    pub name: String,
    pub workspace_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishPackageResponse {
    pub published_package_id: String,
    pub version: String,
    pub module_ids: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConsumableModulesParams {
    /// Comma-separated published package ids
    pub package_ids: Option<String>,
}

#[derive(Clone)]
pub struct PackagesState<U: UnitOfWork + 'static> {
    pub query_service: Arc<PackageQueryService>,
    pub module_query_service: Arc<ModuleQueryService>,
    pub create_use_case: Arc<CreatePackageUseCase<U>>,
    pub publish_use_case: Arc<PublishPackageUseCase<U>>,
    pub delete_use_case: Arc<DeletePackageUseCase<U>>,
}

/// Create a draft package
#[utoipa::path(
    post,
    path = "",
    tag = "packages",
    request_body = CreatePackageRequest,
    responses(
        (status = 200, description = "Package created", body = CreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Duplicate name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_package<U: UnitOfWork>(
    State(state): State<PackagesState<U>>,
    auth: Authenticated,
    Json(req): Json<CreatePackageRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    let command = CreatePackageCommand {
        name: req.name,
        workspace_id: req.workspace_id,
    };

    match state.create_use_case.execute(command, auth.execution_context()).await {
        UseCaseResult::Success(event) => Ok(Json(CreatedResponse::new(event.package_id))),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Get a package
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "packages",
    params(("id" = String, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package found", body = PackageDto),
        (status = 404, description = "Package not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_package<U: UnitOfWork>(
    State(state): State<PackagesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<PackageDto>, PlatformError> {
    let package = state.query_service.get_package(&auth.execution_context(), &id).await?;
    Ok(Json(package))
}

/// Delete (archive) a package with its modules
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "packages",
    params(("id" = String, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package archived", body = SuccessResponse),
        (status = 404, description = "Package not found"),
        (status = 409, description = "A module has instances")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_package<U: UnitOfWork>(
    State(state): State<PackagesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    let command = DeletePackageCommand { package_id: id };

    match state.delete_use_case.execute(command, auth.execution_context()).await {
        UseCaseResult::Success(_event) => Ok(Json(SuccessResponse::ok())),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Publish the next version of a draft package
#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "packages",
    params(("id" = String, Path, description = "Draft package ID")),
    responses(
        (status = 200, description = "Package published", body = PublishPackageResponse),
        (status = 404, description = "Package not found"),
        (status = 409, description = "Published copy or nothing to publish")
    ),
    security(("bearer_auth" = []))
)]
pub async fn publish_package<U: UnitOfWork>(
    State(state): State<PackagesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<PublishPackageResponse>, PlatformError> {
    let command = PublishPackageCommand { package_id: id };

    match state.publish_use_case.execute(command, auth.execution_context()).await {
        UseCaseResult::Success(event) => Ok(Json(PublishPackageResponse {
            published_package_id: event.published_package_id,
            version: event.version,
            module_ids: event.published_module_ids,
        })),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// List the modules of a package
#[utoipa::path(
    get,
    path = "/{id}/modules",
    tag = "packages",
    params(("id" = String, Path, description = "Package ID"), ModeParams),
    responses(
        (status = 200, description = "Modules of the package", body = Vec<ModuleDto>),
        (status = 404, description = "Package not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_package_modules<U: UnitOfWork>(
    State(state): State<PackagesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(params): Query<ModeParams>,
) -> Result<Json<Vec<ModuleDto>>, PlatformError> {
    let modules = state.module_query_service
        .list_modules(&auth.execution_context(), &id, params.mode())
        .await?;
    Ok(Json(modules))
}

/// Published modules available for use in applications
#[utoipa::path(
    get,
    path = "/consumable-modules",
    tag = "packages",
    params(ConsumableModulesParams),
    responses(
        (status = 200, description = "Consumable modules", body = Vec<ModuleDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn consumable_modules<U: UnitOfWork>(
    State(state): State<PackagesState<U>>,
    auth: Authenticated,
    Query(params): Query<ConsumableModulesParams>,
) -> Result<Json<Vec<ModuleDto>>, PlatformError> {
    let package_ids = params.package_ids.as_deref().map(split_csv).unwrap_or_default();
    if package_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let modules = state.module_query_service
        .consumable_modules(&auth.execution_context(), &package_ids)
        .await?;
    Ok(Json(modules))
}

/// OpenAPI documentation for the packages endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        create_package,
        get_package,
        delete_package,
        publish_package,
        list_package_modules,
        consumable_modules,
    ),
    components(schemas(
        CreatePackageRequest,
        PublishPackageResponse,
        PackageDto,
        ModuleDto,
        CreatedResponse,
        SuccessResponse,
    )),
    tags((name = "packages", description = "Package lifecycle and publishing"))
)]
pub struct PackagesApi;

pub fn packages_router<U: UnitOfWork + Clone>(state: PackagesState<U>) -> Router {
    Router::new()
        .route("/", post(create_package::<U>))
        .route("/consumable-modules", get(consumable_modules::<U>))
        .route("/:id", get(get_package::<U>).delete(delete_package::<U>))
        .route("/:id/publish", post(publish_package::<U>))
        .route("/:id/modules", get(list_package_modules::<U>))
        .with_state(state)
}
