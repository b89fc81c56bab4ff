//! MongoDB Index Initialization
//!
//! Creates the indexes the repositories query by. Runs on startup when the
//! MongoDB backend is selected; creating an existing index is a no-op.

use mongodb::{bson::{doc, Document}, options::IndexOptions, Database, IndexModel};
use tracing::info;

use crate::action::entity::ACTIONS_COLLECTION;
use crate::action_collection::entity::ACTION_COLLECTIONS_COLLECTION;
use crate::audit::entity::AUDIT_LOGS_COLLECTION;
use crate::event::entity::EVENTS_COLLECTION;
use crate::module::entity::MODULES_COLLECTION;
use crate::module_instance::entity::MODULE_INSTANCES_COLLECTION;
use crate::package::entity::PACKAGES_COLLECTION;
use crate::permission::entity::PERMISSION_GROUPS_COLLECTION;

pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_indexes(db, PACKAGES_COLLECTION, vec![
        doc! { "workspaceId": 1, "name": 1 },
        doc! { "sourcePackageId": 1 },
    ]).await?;

    create_indexes(db, MODULES_COLLECTION, vec![
        doc! { "packageId": 1, "draft.name": 1 },
        doc! { "originModuleId": 1 },
        doc! { "moduleUuid": 1 },
    ]).await?;

    create_indexes(db, ACTIONS_COLLECTION, vec![
        doc! { "moduleId": 1 },
        doc! { "collectionId": 1 },
        doc! { "applicationId": 1, "isPublic": 1 },
    ]).await?;

    create_indexes(db, ACTION_COLLECTIONS_COLLECTION, vec![
        doc! { "moduleId": 1 },
    ]).await?;

    create_indexes(db, MODULE_INSTANCES_COLLECTION, vec![
        doc! { "sourceModuleId": 1 },
        doc! { "applicationId": 1 },
    ]).await?;

    create_indexes(db, PERMISSION_GROUPS_COLLECTION, vec![
        doc! { "assignedToUserIds": 1 },
    ]).await?;

    create_indexes(db, EVENTS_COLLECTION, vec![
        doc! { "subject": 1, "time": -1 },
    ]).await?;

    create_indexes(db, AUDIT_LOGS_COLLECTION, vec![
        doc! { "entityType": 1, "entityId": 1 },
        doc! { "performedAt": -1 },
    ]).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

async fn create_indexes(
    db: &Database,
    collection_name: &str,
    keys: Vec<Document>,
) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<Document>(collection_name);

    for key in keys {
        collection.create_index(
            IndexModel::builder()
                .keys(key)
                .options(IndexOptions::builder().background(true).build())
                .build(),
        ).await?;
    }

    info!("Created indexes on {}", collection_name);
    Ok(())
}
