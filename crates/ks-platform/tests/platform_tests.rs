//! Platform Workflow Integration Tests
//!
//! Package, module, publish and import workflows run end to end over the
//! in-memory store and unit of work.

use std::collections::BTreeMap;
use std::sync::Arc;

use ks_platform::action::entity::ACTIONS_COLLECTION;
use ks_platform::audit::entity::AUDIT_LOGS_COLLECTION;
use ks_platform::event::entity::EVENTS_COLLECTION;
use ks_platform::module::entity::MODULES_COLLECTION;
use ks_platform::module::operations::{
    CreateModuleCommand, CreateModuleUseCase, DeleteModuleCommand, DeleteModuleUseCase,
    ModuleCreated, ModuleUpdated, PublicEntityDefinition, UpdateModuleCommand, UpdateModuleUseCase,
};
use ks_platform::module_instance::operations::{CreateModuleInstanceCommand, CreateModuleInstanceUseCase};
use ks_platform::package::operations::{
    CreatePackageCommand, CreatePackageUseCase, DeletePackageCommand, DeletePackageUseCase,
    PackagePublished, PublishPackageCommand, PublishPackageUseCase,
};
use ks_platform::shared::features::FeatureFlags;
use ks_platform::{
    permissions, Action, ActionCollection, ActionCollectionRepository, ActionRepository,
    ActionSnapshot, Application, ApplicationRepository, CollectionSnapshot, DocumentStore,
    ExecutionContext, InMemoryUnitOfWork, MemoryStore, ModuleInstanceRepository, ModuleRepository,
    ModuleType, PackageRepository, Policy, UseCaseResult,
};

struct Platform {
    store: Arc<MemoryStore>,
    packages: Arc<PackageRepository>,
    modules: Arc<ModuleRepository>,
    actions: Arc<ActionRepository>,
    collections: Arc<ActionCollectionRepository>,
    instances: Arc<ModuleInstanceRepository>,
    applications: Arc<ApplicationRepository>,
    unit_of_work: Arc<InMemoryUnitOfWork>,
}

impl Platform {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let documents: Arc<dyn DocumentStore> = store.clone();

        Self {
            packages: Arc::new(PackageRepository::new(documents.clone())),
            modules: Arc::new(ModuleRepository::new(documents.clone())),
            actions: Arc::new(ActionRepository::new(documents.clone())),
            collections: Arc::new(ActionCollectionRepository::new(documents.clone())),
            instances: Arc::new(ModuleInstanceRepository::new(documents.clone())),
            applications: Arc::new(ApplicationRepository::new(documents)),
            unit_of_work: Arc::new(InMemoryUnitOfWork::new(store.clone())),
            store,
        }
    }

    async fn create_package(&self, ctx: &ExecutionContext, name: &str) -> String {
        let use_case = CreatePackageUseCase::new(self.packages.clone(), self.unit_of_work.clone());
        let command = CreatePackageCommand {
            name: name.to_string(),
            workspace_id: "ws-1".to_string(),
        };
        use_case.execute(command, ctx.clone()).await.unwrap().package_id
    }

    fn create_module_use_case(&self, features: FeatureFlags) -> CreateModuleUseCase<InMemoryUnitOfWork> {
        CreateModuleUseCase::new(
            self.packages.clone(),
            self.modules.clone(),
            features,
            self.unit_of_work.clone(),
        )
    }

    async fn create_module(
        &self,
        ctx: &ExecutionContext,
        package_id: &str,
        name: &str,
    ) -> UseCaseResult<ModuleCreated> {
        let use_case = self.create_module_use_case(FeatureFlags::default());
        let command = CreateModuleCommand {
            package_id: package_id.to_string(),
            name: name.to_string(),
            module_type: ModuleType::QueryModule,
            inputs: BTreeMap::from([("customerId".to_string(), "{{appsmith.user.id}}".to_string())]),
            entity: Some(PublicEntityDefinition {
                body: Some("select * from orders".to_string()),
                ..Default::default()
            }),
        };
        use_case.execute(command, ctx.clone()).await
    }

    async fn publish(&self, ctx: &ExecutionContext, package_id: &str) -> UseCaseResult<PackagePublished> {
        let use_case = PublishPackageUseCase::new(
            self.packages.clone(),
            self.modules.clone(),
            self.actions.clone(),
            self.collections.clone(),
            self.unit_of_work.clone(),
        );
        let command = PublishPackageCommand { package_id: package_id.to_string() };
        use_case.execute(command, ctx.clone()).await
    }

    async fn rename_module(
        &self,
        ctx: &ExecutionContext,
        module_id: &str,
        name: &str,
    ) -> UseCaseResult<ModuleUpdated> {
        let use_case = UpdateModuleUseCase::new(
            self.modules.clone(),
            self.actions.clone(),
            self.unit_of_work.clone(),
        );
        let command = UpdateModuleCommand {
            module_id: module_id.to_string(),
            name: Some(name.to_string()),
            inputs: None,
        };
        use_case.execute(command, ctx.clone()).await
    }

    async fn create_instance(&self, ctx: &ExecutionContext, module_id: &str, application_id: &str) {
        let use_case = CreateModuleInstanceUseCase::new(
            self.modules.clone(),
            self.applications.clone(),
            self.unit_of_work.clone(),
        );
        let command = CreateModuleInstanceCommand {
            module_id: module_id.to_string(),
            application_id: application_id.to_string(),
            name: "instance1".to_string(),
        };
        use_case.execute(command, ctx.clone()).await.unwrap();
    }

    fn delete_package_use_case(&self) -> DeletePackageUseCase<InMemoryUnitOfWork> {
        DeletePackageUseCase::new(
            self.packages.clone(),
            self.modules.clone(),
            self.actions.clone(),
            self.collections.clone(),
            self.instances.clone(),
            self.unit_of_work.clone(),
        )
    }

    fn delete_module_use_case(&self) -> DeleteModuleUseCase<InMemoryUnitOfWork> {
        DeleteModuleUseCase::new(
            self.modules.clone(),
            self.actions.clone(),
            self.collections.clone(),
            self.instances.clone(),
            self.unit_of_work.clone(),
        )
    }

    async fn create_application(&self) -> Application {
        let application = Application::new("storefront", "ws-1")
            .with_policy(Policy::new(permissions::APPLICATION_MANAGE, ["devs"]))
            .with_policy(Policy::new(permissions::APPLICATION_READ, ["devs"]));
        self.applications.insert(&application).await.unwrap();
        application
    }
}

fn editor() -> ExecutionContext {
    ExecutionContext::create("user-1").with_permission_groups(["devs"])
}

fn outsider() -> ExecutionContext {
    ExecutionContext::create("user-2").with_permission_groups(["strangers"])
}

/// Members of "viewers" may read the package and its modules but not edit them.
fn viewer() -> ExecutionContext {
    ExecutionContext::create("user-3").with_permission_groups(["viewers"])
}

mod module_lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_module_writes_module_and_public_action() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;

        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();

        let module = platform.modules.find_by_id(&created.module_id).await.unwrap().unwrap();
        assert_eq!(module.draft.name, "orders");
        assert!(module.published.is_empty());

        let public_action = platform.actions.find_public_action(&module.id).await.unwrap().unwrap();
        assert_eq!(public_action.id, created.public_action_id);
        assert_eq!(public_action.name(), "orders");
        assert!(public_action.policies.iter().any(|p| p.permission == permissions::ACTION_MANAGE));
    }

    #[tokio::test]
    async fn test_failed_module_creation_writes_nothing() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let events_before = platform.store.len(EVENTS_COLLECTION);

        let err = platform.create_module(&ctx, &package_id, "2orders").await.unwrap_err();

        assert_eq!(err.code(), "INVALID_ACTION_NAME");
        assert_eq!(platform.store.len(MODULES_COLLECTION), 0);
        assert_eq!(platform.store.len(ACTIONS_COLLECTION), 0);
        assert_eq!(platform.store.len(EVENTS_COLLECTION), events_before);
    }

    #[tokio::test]
    async fn test_duplicate_module_name_rejected() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;

        platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let err = platform.create_module(&ctx, &package_id, "orders").await.unwrap_err();

        assert_eq!(err.code(), "DUPLICATE_NAME");
        assert_eq!(platform.modules.find_by_package(&package_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_caller_without_permission_gets_not_found() {
        let platform = Platform::new();
        let package_id = platform.create_package(&editor(), "billing").await;

        let err = platform.create_module(&outsider(), &package_id, "orders").await.unwrap_err();
        assert_eq!(err.code(), "ACL_NO_RESOURCE_FOUND");
        assert_eq!(err.http_status_code(), 404);

        let err = platform.publish(&outsider(), &package_id).await.unwrap_err();
        assert_eq!(err.code(), "ACL_NO_RESOURCE_FOUND");
    }

    #[tokio::test]
    async fn test_rename_propagates_to_public_action() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();

        let use_case = UpdateModuleUseCase::new(
            platform.modules.clone(),
            platform.actions.clone(),
            platform.unit_of_work.clone(),
        );
        let command = UpdateModuleCommand {
            module_id: created.module_id.clone(),
            name: Some("invoices".to_string()),
            inputs: None,
        };
        let event = use_case.execute(command, ctx.clone()).await.unwrap();
        assert_eq!(event.changed_fields, vec!["name".to_string()]);

        let module = platform.modules.find_by_id(&created.module_id).await.unwrap().unwrap();
        assert_eq!(module.draft.name, "invoices");
        assert_eq!(module.draft.inputs.len(), 1);

        let public_action = platform.actions.find_by_id(&created.public_action_id).await.unwrap().unwrap();
        assert_eq!(public_action.name(), "invoices");
    }

    #[tokio::test]
    async fn test_update_without_changes_writes_nothing() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let events_before = platform.store.len(EVENTS_COLLECTION);

        let use_case = UpdateModuleUseCase::new(
            platform.modules.clone(),
            platform.actions.clone(),
            platform.unit_of_work.clone(),
        );
        let command = UpdateModuleCommand {
            module_id: created.module_id,
            name: Some("orders".to_string()),
            inputs: None,
        };
        let event = use_case.execute(command, ctx).await.unwrap();

        assert!(event.changed_fields.is_empty());
        assert_eq!(platform.store.len(EVENTS_COLLECTION), events_before);
    }

    #[tokio::test]
    async fn test_query_module_creation_behind_feature_flag() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;

        let use_case = platform.create_module_use_case(FeatureFlags { query_modules: false });
        let command = CreateModuleCommand {
            package_id,
            name: "orders".to_string(),
            module_type: ModuleType::QueryModule,
            inputs: BTreeMap::new(),
            entity: Some(PublicEntityDefinition::default()),
        };
        let err = use_case.execute(command, ctx).await.unwrap_err();

        assert_eq!(err.code(), "FEATURE_DISABLED");
        assert_eq!(platform.store.len(MODULES_COLLECTION), 0);
    }

    #[tokio::test]
    async fn test_rename_to_existing_name_rejected() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let invoices = platform.create_module(&ctx, &package_id, "invoices").await.unwrap();

        let err = platform.rename_module(&ctx, &invoices.module_id, "orders").await.unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_NAME");

        let module = platform.modules.find_by_id(&invoices.module_id).await.unwrap().unwrap();
        assert_eq!(module.draft.name, "invoices");
    }

    #[tokio::test]
    async fn test_rename_to_illegal_or_blank_name_rejected() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();

        let err = platform.rename_module(&ctx, &created.module_id, "has space").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_ACTION_NAME");

        let err = platform.rename_module(&ctx, &created.module_id, "  ").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");
        assert_eq!(err.details().get("parameter"), Some(&serde_json::json!("name")));
    }

    #[tokio::test]
    async fn test_published_package_rejects_new_modules() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let published = platform.publish(&ctx, &package_id).await.unwrap();
        let modules_before = platform.store.len(MODULES_COLLECTION);

        let err = platform
            .create_module(&ctx, &published.published_package_id, "extra")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "PUBLISHED_VERSION_READ_ONLY");
        assert_eq!(platform.store.len(MODULES_COLLECTION), modules_before);
        let modules = platform.modules.find_by_package(&published.published_package_id).await.unwrap();
        assert_eq!(modules.len(), 1);
    }

    #[tokio::test]
    async fn test_published_module_copy_rejects_edits() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let published = platform.publish(&ctx, &package_id).await.unwrap();
        let published_module_id = published.published_module_ids[0].clone();

        let err = platform.rename_module(&ctx, &published_module_id, "invoices").await.unwrap_err();
        assert_eq!(err.code(), "PUBLISHED_VERSION_READ_ONLY");

        let module = platform.modules.find_by_id(&published_module_id).await.unwrap().unwrap();
        assert_eq!(module.published.name, "orders");
        assert!(module.draft.is_empty());
    }

    #[tokio::test]
    async fn test_delete_module_archives_public_action() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();

        let command = DeleteModuleCommand { module_id: created.module_id.clone() };
        let event = platform.delete_module_use_case().execute(command, ctx).await.unwrap();
        assert_eq!(event.archived_action_ids, vec![created.public_action_id.clone()]);

        let module = platform.modules.find_by_id(&created.module_id).await.unwrap().unwrap();
        assert!(module.deleted_at.is_some());
        let action = platform.actions.find_by_id(&created.public_action_id).await.unwrap().unwrap();
        assert!(action.deleted_at.is_some());
        assert!(platform.modules.find_by_package(&package_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_module_with_instances_rejected() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let published = platform.publish(&ctx, &package_id).await.unwrap();
        let application = platform.create_application().await;

        let instances = CreateModuleInstanceUseCase::new(
            platform.modules.clone(),
            platform.applications.clone(),
            platform.unit_of_work.clone(),
        );
        let command = CreateModuleInstanceCommand {
            module_id: published.published_module_ids[0].clone(),
            application_id: application.id.clone(),
            name: "orders1".to_string(),
        };
        instances.execute(command, ctx.clone()).await.unwrap();

        let command = DeleteModuleCommand { module_id: created.module_id.clone() };
        let err = platform.delete_module_use_case().execute(command, ctx).await.unwrap_err();

        assert_eq!(err.code(), "MODULE_HAS_INSTANCES");
        assert_eq!(err.details().get("instanceCount"), Some(&serde_json::json!(1)));
        let module = platform.modules.find_by_id(&created.module_id).await.unwrap().unwrap();
        assert!(module.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_instance_of_draft_module_rejected() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let application = platform.create_application().await;

        let instances = CreateModuleInstanceUseCase::new(
            platform.modules.clone(),
            platform.applications.clone(),
            platform.unit_of_work.clone(),
        );
        let command = CreateModuleInstanceCommand {
            module_id: created.module_id,
            application_id: application.id,
            name: "orders1".to_string(),
        };
        let err = instances.execute(command, ctx).await.unwrap_err();
        assert_eq!(err.code(), "MODULE_NOT_PUBLISHED");
    }
}

mod publish_tests {
    use super::*;
    use ks_platform::publish::{ModulePublisher, PackagePublishable, PublishingMeta};

    #[tokio::test]
    async fn test_publish_copies_draft_and_leaves_source_untouched() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();

        let event = platform.publish(&ctx, &package_id).await.unwrap();
        assert_eq!(event.version, "1");

        let source = platform.modules.find_by_id(&created.module_id).await.unwrap().unwrap();
        let published = platform.modules.find_by_package(&event.published_package_id).await.unwrap();
        assert_eq!(published.len(), 1);

        let copy = &published[0];
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.published, source.draft);
        assert!(copy.draft.is_empty());
        assert_eq!(copy.module_uuid, source.module_uuid);
        assert_eq!(copy.origin_module_id.as_deref(), Some(source.id.as_str()));
        assert!(source.published.is_empty());

        let public_copy = platform.actions.find_public_action(&copy.id).await.unwrap().unwrap();
        assert_eq!(public_copy.published.name, "orders");
        assert!(public_copy.draft.is_empty());

        let package = platform.packages.find_by_id(&package_id).await.unwrap().unwrap();
        assert!(package.last_published_at.is_some());
        let published_package = platform.packages.find_by_id(&event.published_package_id).await.unwrap().unwrap();
        assert_eq!(published_package.package_uuid, package.package_uuid);
        assert_eq!(published_package.source_package_id.as_deref(), Some(package_id.as_str()));
    }

    #[tokio::test]
    async fn test_republish_yields_identical_snapshots() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        platform.create_module(&ctx, &package_id, "orders").await.unwrap();

        let first = platform.publish(&ctx, &package_id).await.unwrap();
        let second = platform.publish(&ctx, &package_id).await.unwrap();
        assert_eq!(second.version, "2");

        let first_modules = platform.modules.find_by_package(&first.published_package_id).await.unwrap();
        let second_modules = platform.modules.find_by_package(&second.published_package_id).await.unwrap();
        assert_eq!(first_modules[0].published, second_modules[0].published);

        let first_action = platform.actions.find_public_action(&first_modules[0].id).await.unwrap().unwrap();
        let second_action = platform.actions.find_public_action(&second_modules[0].id).await.unwrap().unwrap();
        assert_eq!(first_action.published, second_action.published);
        assert_ne!(first_action.id, second_action.id);
    }

    #[tokio::test]
    async fn test_published_collection_points_at_published_actions() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();

        let mut collection = ActionCollection::new(
            CollectionSnapshot {
                name: "helpers".to_string(),
                ..Default::default()
            },
            Vec::new(),
        )
        .in_module(created.module_id.as_str());
        let js_action = Action::new(ActionSnapshot::named("format"), Vec::new())
            .in_module(created.module_id.as_str())
            .in_collection(collection.id.as_str());
        collection.draft.action_ids = vec![js_action.id.clone()];
        platform.store.insert(&collection).unwrap();
        platform.store.insert(&js_action).unwrap();

        let event = platform.publish(&ctx, &package_id).await.unwrap();
        assert_eq!(event.published_collection_count, 1);

        let published_module_id = event.published_module_ids[0].clone();
        let published = platform.collections.find_by_modules(&[published_module_id.clone()]).await.unwrap();
        assert_eq!(published.len(), 1);
        let published_collection = &published[0];
        assert_eq!(published_collection.published.name, "helpers");
        assert_eq!(published_collection.published.action_ids.len(), 1);

        let new_action_id = &published_collection.published.action_ids[0];
        assert_ne!(new_action_id, &js_action.id);
        let new_action = platform.actions.find_by_id(new_action_id).await.unwrap().unwrap();
        assert_eq!(new_action.collection_id.as_deref(), Some(published_collection.id.as_str()));
        assert_eq!(new_action.module_id.as_deref(), Some(published_module_id.as_str()));
        assert_eq!(new_action.published.name, "format");

        let source = platform.collections.find_by_id(&collection.id).await.unwrap().unwrap();
        assert_eq!(source.draft.action_ids, vec![js_action.id.clone()]);
    }

    #[tokio::test]
    async fn test_publishing_a_published_copy_rejected() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let event = platform.publish(&ctx, &package_id).await.unwrap();

        let err = platform.publish(&ctx, &event.published_package_id).await.unwrap_err();
        assert_eq!(err.code(), "CANNOT_PUBLISH_PUBLISHED_PACKAGE");
    }

    #[tokio::test]
    async fn test_publishing_empty_package_rejected() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;

        let err = platform.publish(&ctx, &package_id).await.unwrap_err();
        assert_eq!(err.code(), "NOTHING_TO_PUBLISH");
        assert_eq!(platform.packages.count_versions(&package_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_publish_in_place_unsupported() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        platform.create_module(&ctx, &package_id, "orders").await.unwrap();

        let source = platform.packages.find_by_id(&package_id).await.unwrap().unwrap();
        let copy = source.published_copy("1", chrono::Utc::now());
        let mut meta = PublishingMeta::new(source, copy);

        let publisher = ModulePublisher::new(platform.modules.clone());
        let modules = publisher.publishable_entities(&mut meta).await.unwrap();
        assert_eq!(meta.module_ids.len(), 1);

        let err = publisher.update_publishable_entities(&meta, modules).await.unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_OPERATION");
    }

    #[tokio::test]
    async fn test_delete_package_archives_modules() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();

        let use_case = DeletePackageUseCase::new(
            platform.packages.clone(),
            platform.modules.clone(),
            platform.actions.clone(),
            platform.collections.clone(),
            platform.instances.clone(),
            platform.unit_of_work.clone(),
        );
        let command = DeletePackageCommand { package_id: package_id.clone() };
        let event = use_case.execute(command, ctx.clone()).await.unwrap();
        assert_eq!(event.archived_module_ids, vec![created.module_id.clone()]);

        let package = platform.packages.find_by_id(&package_id).await.unwrap().unwrap();
        assert!(package.deleted_at.is_some());
        let action = platform.actions.find_by_id(&created.public_action_id).await.unwrap().unwrap();
        assert!(action.deleted_at.is_some());

        let err = platform.publish(&ctx, &package_id).await.unwrap_err();
        assert_eq!(err.code(), "ACL_NO_RESOURCE_FOUND");
    }

    #[tokio::test]
    async fn test_delete_package_with_instances_rejected() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let published = platform.publish(&ctx, &package_id).await.unwrap();
        let application = platform.create_application().await;
        platform.create_instance(&ctx, &published.published_module_ids[0], &application.id).await;

        let command = DeletePackageCommand { package_id: package_id.clone() };
        let err = platform.delete_package_use_case().execute(command, ctx).await.unwrap_err();

        assert_eq!(err.code(), "MODULE_HAS_INSTANCES");
        let package = platform.packages.find_by_id(&package_id).await.unwrap().unwrap();
        assert!(package.deleted_at.is_none());
        let module = platform.modules.find_by_id(&created.module_id).await.unwrap().unwrap();
        assert!(module.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_commits_record_event_and_audit_entry() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        platform.publish(&ctx, &package_id).await.unwrap();

        assert_eq!(platform.store.len(EVENTS_COLLECTION), 3);
        assert_eq!(platform.store.len(AUDIT_LOGS_COLLECTION), 3);
    }
}

mod module_query_tests {
    use super::*;
    use ks_platform::module::ModuleQueryService;
    use ks_platform::shared::api_common::ResourceMode;

    fn query_service(platform: &Platform) -> ModuleQueryService {
        ModuleQueryService::new(platform.packages.clone(), platform.modules.clone())
    }

    /// Draft package readable by "viewers"; its modules inherit module:read.
    async fn shared_package(platform: &Platform, ctx: &ExecutionContext) -> String {
        let package_id = platform.create_package(ctx, "billing").await;
        let mut package = platform.packages.find_by_id(&package_id).await.unwrap().unwrap();
        for policy in package.policies.iter_mut().filter(|p| p.permission == permissions::PACKAGE_READ) {
            policy.permission_groups.insert("viewers".to_string());
        }
        platform.store.insert(&package).unwrap();
        package_id
    }

    #[tokio::test]
    async fn test_get_module_in_edit_and_view_mode() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = shared_package(&platform, &ctx).await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let queries = query_service(&platform);

        let editing = queries.get_module(&ctx, &created.module_id, ResourceMode::Edit).await.unwrap();
        assert_eq!(editing.name, "orders");
        assert!(editing.user_permissions.contains(permissions::MODULE_MANAGE));

        let viewing = queries.get_module(&viewer(), &created.module_id, ResourceMode::View).await.unwrap();
        assert_eq!(viewing.name, "orders");
        assert!(viewing.user_permissions.contains(permissions::MODULE_READ));
        assert!(!viewing.user_permissions.contains(permissions::MODULE_MANAGE));

        let err = queries.get_module(&viewer(), &created.module_id, ResourceMode::Edit).await.unwrap_err();
        assert_eq!(err.code(), "ACL_NO_RESOURCE_FOUND");
    }

    #[tokio::test]
    async fn test_list_modules_hides_archived_and_filters_by_mode() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = shared_package(&platform, &ctx).await;
        platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let invoices = platform.create_module(&ctx, &package_id, "invoices").await.unwrap();

        let command = DeleteModuleCommand { module_id: invoices.module_id.clone() };
        platform.delete_module_use_case().execute(command, ctx.clone()).await.unwrap();

        let queries = query_service(&platform);
        let listed = queries.list_modules(&ctx, &package_id, ResourceMode::Edit).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["orders"]);

        assert!(queries.list_modules(&viewer(), &package_id, ResourceMode::Edit).await.unwrap().is_empty());
        assert_eq!(queries.list_modules(&viewer(), &package_id, ResourceMode::View).await.unwrap().len(), 1);

        let err = queries.list_modules(&outsider(), &package_id, ResourceMode::View).await.unwrap_err();
        assert_eq!(err.code(), "ACL_NO_RESOURCE_FOUND");
    }

    #[tokio::test]
    async fn test_consumable_modules_serve_published_content() {
        let platform = Platform::new();
        let ctx = editor();
        let package_id = platform.create_package(&ctx, "billing").await;
        let created = platform.create_module(&ctx, &package_id, "orders").await.unwrap();
        let published = platform.publish(&ctx, &package_id).await.unwrap();
        platform.rename_module(&ctx, &created.module_id, "invoices").await.unwrap();

        let queries = query_service(&platform);
        let package_ids = vec![published.published_package_id.clone(), package_id.clone()];
        let consumable = queries.consumable_modules(&ctx, &package_ids).await.unwrap();

        assert_eq!(consumable.len(), 1);
        assert_eq!(consumable[0].id, published.published_module_ids[0]);
        assert_eq!(consumable[0].name, "orders");
        assert_eq!(consumable[0].origin_module_id.as_deref(), Some(created.module_id.as_str()));

        assert!(queries.consumable_modules(&outsider(), &package_ids).await.unwrap().is_empty());
    }
}

mod import_tests {
    use super::*;
    use ks_platform::import::{ActionDefinition, ExportService, ImportActionsCommand, ImportActionsUseCase};
    use ks_platform::DatasourceRef;

    fn import_use_case(platform: &Platform) -> ImportActionsUseCase<InMemoryUnitOfWork> {
        ImportActionsUseCase::new(
            platform.applications.clone(),
            platform.actions.clone(),
            platform.unit_of_work.clone(),
        )
    }

    #[tokio::test]
    async fn test_import_updates_matches_and_creates_the_rest() {
        let platform = Platform::new();
        let application = platform.create_application().await;

        let mut public_action = Action::new(ActionSnapshot::named("main"), vec![Policy::new(permissions::ACTION_READ, ["consumers"])])
            .in_application(application.id.as_str())
            .public();
        public_action.draft.fully_qualified_name = Some("orders.main".to_string());
        public_action.module_instance_id = Some("mi-target".to_string());
        public_action.root_module_instance_id = Some("mi-target".to_string());
        platform.store.insert(&public_action).unwrap();

        let page_action = Action::new(ActionSnapshot::named("fetchAll"), Vec::new())
            .in_application(application.id.as_str());
        platform.store.insert(&page_action).unwrap();

        let mut incoming_public = ActionDefinition::named("main");
        incoming_public.is_public = true;
        incoming_public.action.fully_qualified_name = Some("orders.main".to_string());
        incoming_public.action.datasource = Some(DatasourceRef {
            id: Some("ds-from-elsewhere".to_string()),
            name: Some("prod".to_string()),
            plugin_id: Some("postgres".to_string()),
            auto_generated: false,
        });
        incoming_public.module_instance_id = Some("mi-source".to_string());

        let mut incoming_page = ActionDefinition::named("fetchAll");
        incoming_page.action.body = Some("select 1".to_string());

        let command = ImportActionsCommand {
            application_id: application.id.clone(),
            actions: vec![incoming_public, incoming_page, ActionDefinition::named("brandNew")],
            module_instance_refs: BTreeMap::from([("mi-source".to_string(), "mi-target".to_string())]),
        };
        let event = import_use_case(&platform).execute(command, editor()).await.unwrap();

        assert_eq!(event.updated_action_ids, vec![public_action.id.clone(), page_action.id.clone()]);
        assert_eq!(event.created_action_ids.len(), 1);

        let updated = platform.actions.find_by_id(&public_action.id).await.unwrap().unwrap();
        assert_eq!(updated.policies, public_action.policies);
        assert_eq!(updated.module_instance_id.as_deref(), Some("mi-target"));
        let datasource = updated.draft.datasource.unwrap();
        assert!(datasource.auto_generated);
        assert!(datasource.id.is_none());
        assert_eq!(datasource.plugin_id.as_deref(), Some("postgres"));

        let page = platform.actions.find_by_id(&page_action.id).await.unwrap().unwrap();
        assert_eq!(page.draft.body.as_deref(), Some("select 1"));

        let created = platform.actions.find_by_id(&event.created_action_ids[0]).await.unwrap().unwrap();
        assert_eq!(created.application_id.as_deref(), Some(application.id.as_str()));
        assert!(created.policies.iter().any(|p| p.permission == permissions::ACTION_MANAGE));
        assert_eq!(platform.actions.find_by_application(&application.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_instance_ref_is_not_carried_over() {
        let platform = Platform::new();
        let application = platform.create_application().await;

        let mut incoming = ActionDefinition::named("main");
        incoming.is_public = true;
        incoming.action.fully_qualified_name = Some("orders.main".to_string());
        incoming.module_instance_id = Some("mi-elsewhere".to_string());
        incoming.root_module_instance_id = Some("mi-elsewhere".to_string());

        let command = ImportActionsCommand {
            application_id: application.id.clone(),
            actions: vec![incoming],
            module_instance_refs: BTreeMap::new(),
        };
        let event = import_use_case(&platform).execute(command, editor()).await.unwrap();

        let created = platform.actions.find_by_id(&event.created_action_ids[0]).await.unwrap().unwrap();
        assert!(created.is_public);
        assert!(created.module_instance_id.is_none());
        assert!(created.root_module_instance_id.is_none());
    }

    #[tokio::test]
    async fn test_empty_import_rejected() {
        let platform = Platform::new();
        let application = platform.create_application().await;

        let command = ImportActionsCommand {
            application_id: application.id,
            actions: Vec::new(),
            module_instance_refs: BTreeMap::new(),
        };
        let err = import_use_case(&platform).execute(command, editor()).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");
    }

    #[tokio::test]
    async fn test_import_into_hidden_application_not_found() {
        let platform = Platform::new();
        let application = platform.create_application().await;

        let command = ImportActionsCommand {
            application_id: application.id,
            actions: vec![ActionDefinition::named("run")],
            module_instance_refs: BTreeMap::new(),
        };
        let err = import_use_case(&platform).execute(command, outsider()).await.unwrap_err();
        assert_eq!(err.code(), "ACL_NO_RESOURCE_FOUND");
        assert_eq!(platform.store.len(ACTIONS_COLLECTION), 0);
    }

    #[tokio::test]
    async fn test_export_then_import_updates_in_place() {
        let platform = Platform::new();
        let application = platform.create_application().await;
        let action = Action::new(ActionSnapshot::named("fetchAll"), vec![Policy::new(permissions::ACTION_READ, ["devs"])])
            .in_application(application.id.as_str());
        platform.store.insert(&action).unwrap();

        let export = ExportService::new(platform.applications.clone(), platform.actions.clone());
        let definitions = export.export_application(&editor(), &application.id).await.unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name(), "fetchAll");

        let command = ImportActionsCommand {
            application_id: application.id.clone(),
            actions: definitions,
            module_instance_refs: BTreeMap::new(),
        };
        let event = import_use_case(&platform).execute(command, editor()).await.unwrap();
        assert_eq!(event.updated_action_ids, vec![action.id.clone()]);
        assert!(event.created_action_ids.is_empty());
    }
}
