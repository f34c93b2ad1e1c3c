//! Collection-scoped CRUD primitives over opaque BSON documents.
//!
//! This layer knows collections and filters, never resources: repositories
//! bind one [`CollectionOps`] per collection and do all domain translation
//! themselves. Every failure is wrapped with the collection and operation
//! that raised it and surfaced unchanged; nothing is retried here.

use std::sync::Arc;

use futures_util::{StreamExt, TryStreamExt};
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};

use crate::domain::Page;

use super::client::{ClientError, DocumentClient};

/// Lazy, finite sequence of documents produced by a find.
///
/// Nothing is materialised beyond the driver's cursor batches; dropping
/// the stream early abandons the remainder.
pub type DocumentStream =
    futures_util::stream::BoxStream<'static, Result<Document, OperationError>>;

/// Failures raised by the operation layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// No usable session for the bound collection.
    #[error("no store session for collection {collection}: {message}")]
    Session {
        /// Collection the operation was bound to.
        collection: String,
        /// Underlying client failure.
        message: String,
    },

    /// A driver command failed in transport or at the protocol level.
    #[error("{operation} on collection {collection} failed: {message}")]
    Command {
        /// Collection the operation was bound to.
        collection: String,
        /// The CRUD primitive that failed.
        operation: &'static str,
        /// Server error code, when the failure carries one.
        code: Option<i32>,
        /// Driver-provided failure description.
        message: String,
    },
}

/// Server error code for a violated unique index.
const DUPLICATE_KEY_CODE: i32 = 11000;

impl OperationError {
    /// Server error code, when the underlying failure carried one.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::Session { .. } => None,
            Self::Command { code, .. } => *code,
        }
    }

    /// Whether the failure is the store rejecting a duplicate key.
    #[must_use]
    pub const fn is_duplicate_key(&self) -> bool {
        matches!(self.code(), Some(DUPLICATE_KEY_CODE))
    }
}

/// Extract the server error code from a driver failure, when present.
fn driver_error_code(error: &mongodb::error::Error) -> Option<i32> {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
        ErrorKind::Write(WriteFailure::WriteConcernError(concern)) => Some(concern.code),
        ErrorKind::Command(command) => Some(command.code),
        _ => None,
    }
}

/// CRUD primitives bound to one `(client, collection)` pair.
///
/// Stateless beyond the binding; cheap to construct per collection.
pub struct CollectionOps {
    client: Arc<DocumentClient>,
    collection: String,
}

impl CollectionOps {
    /// Bind a client to a collection name.
    pub fn new(client: Arc<DocumentClient>, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    /// Name of the bound collection.
    #[must_use]
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Find at most one document matching `filter`.
    pub async fn find_one(&self, filter: Document) -> Result<Option<Document>, OperationError> {
        self.handle()
            .await?
            .find_one(filter)
            .await
            .map_err(|err| self.command_error("find_one", &err))
    }

    /// Find documents matching `filter` within the pagination window.
    ///
    /// Results are ordered by `_id` ascending so paging is deterministic.
    /// The returned stream is lazy; consumers may stop early without the
    /// remainder ever leaving the store.
    pub async fn find_many(
        &self,
        filter: Document,
        page: Page,
    ) -> Result<DocumentStream, OperationError> {
        let cursor = self
            .handle()
            .await?
            .find(filter)
            .sort(doc! { "_id": 1 })
            .skip(page.offset())
            .limit(page.limit())
            .await
            .map_err(|err| self.command_error("find_many", &err))?;

        let collection = self.collection.clone();
        Ok(cursor
            .map_err(move |err| OperationError::Command {
                collection: collection.clone(),
                operation: "find_many",
                code: driver_error_code(&err),
                message: err.to_string(),
            })
            .boxed())
    }

    /// Insert one document and return the store-assigned identifier.
    pub async fn insert_one(&self, document: Document) -> Result<Bson, OperationError> {
        self.handle()
            .await?
            .insert_one(document)
            .await
            .map(|outcome| outcome.inserted_id)
            .map_err(|err| self.command_error("insert_one", &err))
    }

    /// Apply `update` to the first document matching `filter`.
    ///
    /// Returns the modified count; 0 means no match or no change and is
    /// not an error.
    pub async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<u64, OperationError> {
        self.handle()
            .await?
            .update_one(filter, update)
            .await
            .map(|outcome| outcome.modified_count)
            .map_err(|err| self.command_error("update_one", &err))
    }

    /// Delete the first document matching `filter`; returns the deleted
    /// count.
    pub async fn delete_one(&self, filter: Document) -> Result<u64, OperationError> {
        self.handle()
            .await?
            .delete_one(filter)
            .await
            .map(|outcome| outcome.deleted_count)
            .map_err(|err| self.command_error("delete_one", &err))
    }

    /// Delete every document matching `filter`; returns the deleted count.
    pub async fn delete_many(&self, filter: Document) -> Result<u64, OperationError> {
        self.handle()
            .await?
            .delete_many(filter)
            .await
            .map(|outcome| outcome.deleted_count)
            .map_err(|err| self.command_error("delete_many", &err))
    }

    /// Count documents matching `filter`.
    pub async fn count(&self, filter: Document) -> Result<u64, OperationError> {
        self.handle()
            .await?
            .count_documents(filter)
            .await
            .map_err(|err| self.command_error("count", &err))
    }

    async fn handle(
        &self,
    ) -> Result<mongodb::Collection<Document>, OperationError> {
        self.client
            .collection(&self.collection)
            .await
            .map_err(|err| self.session_error(&err))
    }

    fn session_error(&self, error: &ClientError) -> OperationError {
        OperationError::Session {
            collection: self.collection.clone(),
            message: error.to_string(),
        }
    }

    fn command_error(
        &self,
        operation: &'static str,
        error: &mongodb::error::Error,
    ) -> OperationError {
        OperationError::Command {
            collection: self.collection.clone(),
            operation,
            code: driver_error_code(error),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Error classification and session-gating coverage.
    use std::sync::Arc;

    use mongodb::bson::doc;

    use super::{CollectionOps, OperationError};
    use crate::domain::Page;
    use crate::outbound::persistence::client::DocumentClient;
    use crate::outbound::persistence::settings::StoreSettings;

    fn disconnected_ops() -> CollectionOps {
        let settings =
            StoreSettings::new("mongodb://localhost:27017", "appdb").expect("valid settings");
        CollectionOps::new(Arc::new(DocumentClient::new(settings)), "users")
    }

    #[test]
    fn duplicate_key_classification_uses_the_server_code() {
        let conflict = OperationError::Command {
            collection: "users".to_owned(),
            operation: "insert_one",
            code: Some(11000),
            message: "E11000 duplicate key error".to_owned(),
        };
        assert!(conflict.is_duplicate_key());

        let other = OperationError::Command {
            collection: "users".to_owned(),
            operation: "insert_one",
            code: Some(2),
            message: "BadValue".to_owned(),
        };
        assert!(!other.is_duplicate_key());

        let session = OperationError::Session {
            collection: "users".to_owned(),
            message: "not connected".to_owned(),
        };
        assert!(!session.is_duplicate_key());
        assert_eq!(session.code(), None);
    }

    #[tokio::test]
    async fn every_operation_without_a_session_fails_with_context() {
        let ops = disconnected_ops();
        let err = ops
            .find_one(doc! { "email": "ada@example.com" })
            .await
            .expect_err("no session");
        assert!(matches!(
            err,
            OperationError::Session { ref collection, .. } if collection == "users"
        ));

        let outcomes = [
            ops.find_many(doc! {}, Page::default()).await.map(|_| 0_u64),
            ops.insert_one(doc! { "name": "Ada" }).await.map(|_| 0_u64),
            ops.update_one(doc! {}, doc! { "$set": { "name": "Ada" } })
                .await,
            ops.delete_one(doc! {}).await,
            ops.delete_many(doc! {}).await,
            ops.count(doc! {}).await,
        ];
        for outcome in outcomes {
            assert!(matches!(outcome, Err(OperationError::Session { .. })));
        }
    }

    #[test]
    fn errors_name_the_collection_and_operation() {
        let err = OperationError::Command {
            collection: "users".to_owned(),
            operation: "update_one",
            code: None,
            message: "socket closed".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "update_one on collection users failed: socket closed"
        );
    }
}
