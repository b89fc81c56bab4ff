//! Keystone Platform Server
//!
//! Serves the package, module, module instance and application APIs, the
//! health checks and the OpenAPI document.
//!
//! Configuration comes from `keystone.toml` (or `KEYSTONE_CONFIG`), with
//! `KEYSTONE_*` environment overrides; see `ks_config::ConfigLoader`.
//! `RUST_LOG` and `LOG_FORMAT` control logging.

use std::sync::Arc;

use anyhow::Result;
use axum::{http::HeaderValue, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ks_config::{AppConfig, StorageBackend};
use ks_platform::api::{
    applications_router, health_router, module_instances_router, modules_router, packages_router,
    ApiDoc, AppState, ApplicationsState, AuthLayer, HealthState, ModuleInstancesState,
    ModulesState, PackagesState,
};
use ks_platform::import::{ExportService, ImportActionsUseCase};
use ks_platform::module::operations::{CreateModuleUseCase, DeleteModuleUseCase, UpdateModuleUseCase};
use ks_platform::module::ModuleQueryService;
use ks_platform::module_instance::operations::CreateModuleInstanceUseCase;
use ks_platform::package::operations::{CreatePackageUseCase, DeletePackageUseCase, PublishPackageUseCase};
use ks_platform::package::PackageQueryService;
use ks_platform::shared::features::FeatureFlags;
use ks_platform::shared::indexes::initialize_indexes;
use ks_platform::{
    ActionCollectionRepository, ActionRepository, ApplicationRepository, DocumentStore,
    InMemoryUnitOfWork, MemoryStore, ModuleInstanceRepository, ModuleRepository,
    LicenseStatus, LicenseValidator, MongoDocumentStore, MongoUnitOfWork, PackageRepository,
    PermissionGroup, PermissionGroupRepository, TokenConfig, TokenService, UnitOfWork,
};

const DEV_PRINCIPAL_ID: &str = "dev-user";

#[tokio::main]
async fn main() -> Result<()> {
    ks_common::logging::init_logging("ks-platform-server");

    info!("Starting Keystone Platform Server");

    let config = AppConfig::load()?;
    config.validate()?;

    if !config.license.key.is_empty() {
        check_license(&config.license.verification_key, &config.license.key)?;
    }

    let token_config = if config.auth.jwt_secret.is_empty() {
        warn!("auth.jwt_secret not set; using the development secret");
        TokenConfig {
            issuer: config.auth.issuer.clone(),
            audience: config.auth.audience.clone(),
            ..TokenConfig::default()
        }
    } else {
        TokenConfig {
            secret_key: config.auth.jwt_secret.clone(),
            issuer: config.auth.issuer.clone(),
            audience: config.auth.audience.clone(),
            ..TokenConfig::default()
        }
    };
    let token_service = Arc::new(TokenService::new(token_config));
    let features = FeatureFlags {
        query_modules: config.features.query_modules,
    };

    let (api, store, health_state) = match config.storage.backend {
        StorageBackend::Mongodb => {
            info!("Connecting to MongoDB: {}/{}", config.mongodb.uri, config.mongodb.database);
            let client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
            let db = client.database(&config.mongodb.database);

            if config.storage.initialize_indexes {
                initialize_indexes(&db).await?;
            }

            let store: Arc<dyn DocumentStore> = Arc::new(MongoDocumentStore::new(db.clone()));
            let unit_of_work = Arc::new(MongoUnitOfWork::new(client, db.clone()));
            let health_state = HealthState::new(Some(db), Some(env!("CARGO_PKG_VERSION").to_string()));
            (api_router(store.clone(), unit_of_work, features), store, health_state)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            let memory = Arc::new(MemoryStore::new());
            let store: Arc<dyn DocumentStore> = memory.clone();
            let unit_of_work = Arc::new(InMemoryUnitOfWork::new(memory));
            let health_state = HealthState::new(None, Some(env!("CARGO_PKG_VERSION").to_string()));
            (api_router(store.clone(), unit_of_work, features), store, health_state)
        }
    };

    let permission_groups = Arc::new(PermissionGroupRepository::new(store));
    if config.dev_mode {
        seed_dev_principal(&permission_groups, &token_service).await;
    }

    let app_state = AppState {
        token_service,
        permission_groups,
    };

    let app = Router::new()
        .merge(api)
        .nest("/health", health_router(health_state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", ApiDoc::openapi()))
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    health_state.set_ready();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Keystone Platform Server shutdown complete");
    Ok(())
}

/// Repositories, use cases and routers over one storage backend.
fn api_router<U: UnitOfWork + Clone + 'static>(
    store: Arc<dyn DocumentStore>,
    unit_of_work: Arc<U>,
    features: FeatureFlags,
) -> Router {
    let package_repo = Arc::new(PackageRepository::new(store.clone()));
    let module_repo = Arc::new(ModuleRepository::new(store.clone()));
    let action_repo = Arc::new(ActionRepository::new(store.clone()));
    let collection_repo = Arc::new(ActionCollectionRepository::new(store.clone()));
    let instance_repo = Arc::new(ModuleInstanceRepository::new(store.clone()));
    let application_repo = Arc::new(ApplicationRepository::new(store));

    let module_query_service = Arc::new(ModuleQueryService::new(package_repo.clone(), module_repo.clone()));

    let packages_state = PackagesState {
        query_service: Arc::new(PackageQueryService::new(package_repo.clone())),
        module_query_service: module_query_service.clone(),
        create_use_case: Arc::new(CreatePackageUseCase::new(package_repo.clone(), unit_of_work.clone())),
        publish_use_case: Arc::new(PublishPackageUseCase::new(
            package_repo.clone(),
            module_repo.clone(),
            action_repo.clone(),
            collection_repo.clone(),
            unit_of_work.clone(),
        )),
        delete_use_case: Arc::new(DeletePackageUseCase::new(
            package_repo.clone(),
            module_repo.clone(),
            action_repo.clone(),
            collection_repo.clone(),
            instance_repo.clone(),
            unit_of_work.clone(),
        )),
    };

    let modules_state = ModulesState {
        query_service: module_query_service,
        create_use_case: Arc::new(CreateModuleUseCase::new(
            package_repo,
            module_repo.clone(),
            features,
            unit_of_work.clone(),
        )),
        update_use_case: Arc::new(UpdateModuleUseCase::new(
            module_repo.clone(),
            action_repo.clone(),
            unit_of_work.clone(),
        )),
        delete_use_case: Arc::new(DeleteModuleUseCase::new(
            module_repo.clone(),
            action_repo.clone(),
            collection_repo,
            instance_repo,
            unit_of_work.clone(),
        )),
    };

    let module_instances_state = ModuleInstancesState {
        create_use_case: Arc::new(CreateModuleInstanceUseCase::new(
            module_repo,
            application_repo.clone(),
            unit_of_work.clone(),
        )),
    };

    let applications_state = ApplicationsState {
        import_use_case: Arc::new(ImportActionsUseCase::new(
            application_repo.clone(),
            action_repo.clone(),
            unit_of_work,
        )),
        export_service: Arc::new(ExportService::new(application_repo, action_repo)),
    };

    Router::new()
        .nest("/api/packages", packages_router(packages_state))
        .nest("/api/modules", modules_router(modules_state))
        .nest("/api/module-instances", module_instances_router(module_instances_state))
        .nest("/api/applications", applications_router(applications_state))
}

/// Verify the offline license key and report its status. Only a malformed
/// verification key stops startup.
fn check_license(verification_key: &str, license_key: &str) -> Result<()> {
    let license = LicenseValidator::from_hex(verification_key)?.check(license_key);
    match license.status {
        Some(LicenseStatus::Active) => info!(
            license_type = license.license_type.as_deref().unwrap_or("unknown"),
            expiry = ?license.expiry,
            "License is active"
        ),
        Some(LicenseStatus::Expired) => warn!(expiry = ?license.expiry, "License has expired"),
        None => warn!("License key could not be verified"),
    }
    Ok(())
}

/// Dev mode: a permission group for the dev principal and a token to call
/// the API with.
async fn seed_dev_principal(permission_groups: &PermissionGroupRepository, token_service: &TokenService) {
    let group = PermissionGroup::new("developers").with_user(DEV_PRINCIPAL_ID);
    if let Err(e) = permission_groups.insert(&group).await {
        warn!("Dev permission group not seeded: {}", e);
        return;
    }

    match token_service.generate_token(DEV_PRINCIPAL_ID) {
        Ok(token) => info!(group_id = %group.id, "Dev token for {}: {}", DEV_PRINCIPAL_ID, token),
        Err(e) => warn!("Dev token not generated: {}", e),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if allowed.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received...");
}
