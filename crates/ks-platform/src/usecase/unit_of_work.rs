//! Unit of Work
//!
//! Atomic commit of entity writes, the domain event and the audit log entry.
//! `MongoUnitOfWork` uses a multi-document transaction; `InMemoryUnitOfWork`
//! applies everything under one write lock of the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::{
    Client, ClientSession, Database,
    bson::{doc, Document, to_document},
};
use serde::Serialize;
use tracing::{debug, error};

use super::domain_event::DomainEvent;
use super::error::UseCaseError;
use super::result::UseCaseResult;
use crate::audit::entity::{AuditLog, AUDIT_LOGS_COLLECTION};
use crate::event::entity::{Event, EVENTS_COLLECTION};
use crate::shared::error::PlatformError;
use crate::shared::memory_store::MemoryStore;

/// Unit of Work for atomic platform operations.
///
/// **This is the only way to create a successful `UseCaseResult` for an
/// operation that changes state.** `UseCaseResult::success()` is
/// crate-private, so a use case reports success by committing, which
/// guarantees that:
/// - a domain event is emitted for every state change
/// - an audit log entry is written for every command
/// - entity state and events are consistent (atomic commit)
///
/// ```ignore
/// let writes = vec![
///     PendingWrite::upsert(&module)?,
///     PendingWrite::upsert(&public_action)?,
/// ];
/// let event = ModuleCreated::new(&ctx, &module, &public_action);
/// self.unit_of_work.commit_all(writes, event, &command).await
/// ```
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Persist a single aggregate with its domain event.
    async fn commit<E, T, C>(
        &self,
        aggregate: &T,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Serialize + HasId + Send + Sync,
        C: Serialize + Send + Sync,
    {
        match PendingWrite::upsert(aggregate) {
            Ok(write) => self.commit_all(vec![write], event, command).await,
            Err(e) => UseCaseResult::failure(e),
        }
    }

    /// Apply every write, then store the event and the audit log entry.
    /// Either all of it is persisted or none of it is.
    async fn commit_all<E, C>(
        &self,
        writes: Vec<PendingWrite>,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync;
}

/// Trait for entities stored as one document keyed by `_id`.
pub trait HasId {
    fn id(&self) -> &str;
    fn collection_name() -> &'static str;
}

impl HasId for Event {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        EVENTS_COLLECTION
    }
}

impl HasId for AuditLog {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        AUDIT_LOGS_COLLECTION
    }
}

/// A write staged by a use case, applied by the unit of work.
#[derive(Debug, Clone)]
pub enum PendingWrite {
    /// Replace the whole document, inserting it if absent.
    Upsert {
        collection: &'static str,
        id: String,
        document: Document,
    },
    /// `$set` the given (possibly dotted) paths on an existing document.
    SetFields {
        collection: &'static str,
        id: String,
        fields: Document,
    },
}

impl PendingWrite {
    pub fn upsert<T: Serialize + HasId>(aggregate: &T) -> Result<Self, UseCaseError> {
        let document = to_document(aggregate).map_err(|e| {
            UseCaseError::commit(format!("Failed to serialize aggregate: {}", e))
        })?;

        Ok(PendingWrite::Upsert {
            collection: T::collection_name(),
            id: aggregate.id().to_string(),
            document,
        })
    }

    pub fn set_fields(collection: &'static str, id: impl Into<String>, fields: Document) -> Self {
        PendingWrite::SetFields {
            collection,
            id: id.into(),
            fields,
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            PendingWrite::Upsert { collection, .. } => collection,
            PendingWrite::SetFields { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            PendingWrite::Upsert { id, .. } => id,
            PendingWrite::SetFields { id, .. } => id,
        }
    }
}

/// MongoDB implementation of UnitOfWork using multi-document transactions.
///
/// Requires a replica set deployment (MongoDB 4.0+).
#[derive(Clone)]
pub struct MongoUnitOfWork {
    client: Client,
    database: Database,
}

impl MongoUnitOfWork {
    pub fn new(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    async fn write_in_transaction(
        &self,
        session: &mut ClientSession,
        writes: &[PendingWrite],
        event: &Event,
        audit_log: &AuditLog,
    ) -> Result<(), PlatformError> {
        for write in writes {
            let collection = self.database.collection::<Document>(write.collection());
            match write {
                PendingWrite::Upsert { id, document, .. } => {
                    collection
                        .replace_one(doc! { "_id": id }, document)
                        .upsert(true)
                        .session(&mut *session)
                        .await?;
                }
                PendingWrite::SetFields { collection: name, id, fields } => {
                    let result = collection
                        .update_one(doc! { "_id": id }, doc! { "$set": fields.clone() })
                        .session(&mut *session)
                        .await?;
                    if result.matched_count == 0 {
                        return Err(PlatformError::not_found(*name, id));
                    }
                }
            }
        }

        self.database
            .collection::<Event>(EVENTS_COLLECTION)
            .insert_one(event)
            .session(&mut *session)
            .await?;

        self.database
            .collection::<AuditLog>(AUDIT_LOGS_COLLECTION)
            .insert_one(audit_log)
            .session(&mut *session)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MongoUnitOfWork {
    async fn commit_all<E, C>(
        &self,
        writes: Vec<PendingWrite>,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync,
    {
        let mut session = match self.client.start_session().await {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to start MongoDB session: {}", e);
                return UseCaseResult::failure(UseCaseError::commit(
                    format!("Failed to start session: {}", e)
                ));
            }
        };

        if let Err(e) = session.start_transaction().await {
            error!("Failed to start transaction: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(
                format!("Failed to start transaction: {}", e)
            ));
        }

        let stored_event = Event::from_domain_event(&event);
        let audit_log = AuditLog::for_command(&event, command);

        if let Err(e) = self
            .write_in_transaction(&mut session, &writes, &stored_event, &audit_log)
            .await
        {
            let _ = session.abort_transaction().await;
            error!(event_type = event.event_type(), "Transaction aborted: {}", e);
            return UseCaseResult::failure(e.into());
        }

        if let Err(e) = session.commit_transaction().await {
            error!("Failed to commit transaction: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(
                format!("Failed to commit transaction: {}", e)
            ));
        }

        debug!(
            event_id = event.event_id(),
            event_type = event.event_type(),
            write_count = writes.len(),
            "Successfully committed transaction"
        );

        UseCaseResult::success(event)
    }
}

/// UnitOfWork over the in-memory document store.
///
/// Used by the `memory` storage backend and by tests; the event and audit
/// records land in the same store as the entities.
#[derive(Clone)]
pub struct InMemoryUnitOfWork {
    store: Arc<MemoryStore>,
}

impl InMemoryUnitOfWork {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit_all<E, C>(
        &self,
        mut writes: Vec<PendingWrite>,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync,
    {
        let stored_event = Event::from_domain_event(&event);
        let audit_log = AuditLog::for_command(&event, command);

        for record in [PendingWrite::upsert(&stored_event), PendingWrite::upsert(&audit_log)] {
            match record {
                Ok(write) => writes.push(write),
                Err(e) => return UseCaseResult::failure(e),
            }
        }

        if let Err(e) = self.store.apply(&writes) {
            error!(event_type = event.event_type(), "In-memory commit rejected: {}", e);
            return UseCaseResult::failure(e.into());
        }

        debug!(
            event_id = event.event_id(),
            event_type = event.event_type(),
            write_count = writes.len(),
            "Committed to in-memory store"
        );

        UseCaseResult::success(event)
    }
}
