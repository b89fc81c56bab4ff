//! OpenAPI document for the whole service

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::import::api::ApplicationsApi;
use crate::module::api::ModulesApi;
use crate::module_instance::api::ModuleInstancesApi;
use crate::package::api::PackagesApi;
use crate::shared::error::ErrorResponse;
use crate::shared::health_api::{HealthCheck, HealthResponse, HealthStatus, SimpleHealthResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Keystone Platform API",
        version = "1.0.0",
        description = "Packages, modules, publishing and action import/export"
    ),
    paths(
        crate::shared::health_api::get_health,
        crate::shared::health_api::get_liveness,
        crate::shared::health_api::get_readiness,
    ),
    components(schemas(
        HealthStatus,
        HealthCheck,
        HealthResponse,
        SimpleHealthResponse,
        ErrorResponse,
    )),
    nest(
        (path = "/api/packages", api = PackagesApi),
        (path = "/api/modules", api = ModulesApi),
        (path = "/api/module-instances", api = ModuleInstancesApi),
        (path = "/api/applications", api = ApplicationsApi),
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_nests_aggregate_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/packages/{id}/publish"));
        assert!(doc.paths.paths.contains_key("/api/applications/{id}/import"));
        assert!(doc.paths.paths.contains_key("/health/ready"));
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
