//! Document-store implementation of the `UserRepository` port.
//!
//! A thin adapter: domain values are translated to BSON documents on the
//! way in, documents back to domain values on the way out, and driver
//! failures into the port taxonomy. No business logic lives here.

use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use mongodb::bson::{Bson, Document, doc};
use tracing::debug;

use crate::domain::ports::{UserRepository, UserStoreError};
use crate::domain::{Age, EmailAddress, NewUser, Page, User, UserId, UserName, UserPatch};

use super::client::{ClientError, DocumentClient};
use super::models::UserDocument;
use super::operations::{CollectionOps, OperationError};

/// Collection holding user records.
pub const USERS_COLLECTION: &str = "users";

const UNIQUE_EMAIL_INDEX: &str = "unique_email";

/// Document-store backed [`UserRepository`] adapter.
pub struct MongoUserRepository {
    client: Arc<DocumentClient>,
    ops: CollectionOps,
}

impl MongoUserRepository {
    /// Bind the repository to a connected client.
    pub fn new(client: Arc<DocumentClient>) -> Self {
        let ops = CollectionOps::new(Arc::clone(&client), USERS_COLLECTION);
        Self { client, ops }
    }

    /// Create the unique email index backing the create-time uniqueness
    /// constraint. Idempotent; intended to run once at startup.
    pub async fn ensure_indexes(&self) -> Result<(), UserStoreError> {
        let command = doc! {
            "createIndexes": USERS_COLLECTION,
            "indexes": [{
                "key": { "email": 1 },
                "name": UNIQUE_EMAIL_INDEX,
                "unique": true,
            }],
        };
        self.client
            .run_command(command)
            .await
            .map(|_| ())
            .map_err(|err| map_client_error(&err))?;
        debug!(collection = USERS_COLLECTION, index = UNIQUE_EMAIL_INDEX, "index ensured");
        Ok(())
    }
}

fn map_client_error(error: &ClientError) -> UserStoreError {
    match error {
        ClientError::Connect { .. } | ClientError::NotConnected => {
            UserStoreError::connection(error.to_string())
        }
        ClientError::Command { .. } => UserStoreError::query(error.to_string()),
    }
}

fn map_operation_error(error: OperationError) -> UserStoreError {
    if error.is_duplicate_key() {
        return UserStoreError::conflict("a user with this email already exists");
    }
    match error {
        OperationError::Session { .. } => UserStoreError::connection(error.to_string()),
        OperationError::Command { .. } => UserStoreError::query(error.to_string()),
    }
}

fn id_filter(id: &UserId) -> Result<Document, UserStoreError> {
    let oid = ObjectId::parse_str(id.as_ref()).map_err(|err| {
        UserStoreError::query(format!("user id {id} is not a store identifier: {err}"))
    })?;
    Ok(doc! { "_id": oid })
}

fn new_user_document(
    user: &NewUser,
    created_at: DateTime<Utc>,
) -> Result<Document, UserStoreError> {
    let record = UserDocument {
        id: None,
        name: user.name().as_ref().to_owned(),
        email: user.email().as_ref().to_owned(),
        age: user.age().map(|age| i64::from(age.years())),
        created_at,
    };
    bson::to_document(&record)
        .map_err(|err| UserStoreError::query(format!("user record does not encode: {err}")))
}

fn patch_update(patch: &UserPatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = patch.name() {
        set.insert("name", name.as_ref());
    }
    if let Some(email) = patch.email() {
        set.insert("email", email.as_ref());
    }
    if let Some(age) = patch.age() {
        set.insert("age", i64::from(age.years()));
    }
    doc! { "$set": set }
}

/// Translate a stored document into a domain user.
///
/// Total by construction: any shape or field failure is a
/// [`UserStoreError::Corrupt`]; a partially populated user is never
/// produced.
fn document_to_user(document: Document) -> Result<User, UserStoreError> {
    let record: UserDocument = bson::from_document(document)
        .map_err(|err| UserStoreError::corrupt(format!("user record does not decode: {err}")))?;
    record_to_user(record)
}

fn record_to_user(record: UserDocument) -> Result<User, UserStoreError> {
    let oid = record
        .id
        .ok_or_else(|| UserStoreError::corrupt("user record is missing its identifier"))?;
    let id = UserId::new(oid.to_hex())
        .map_err(|err| UserStoreError::corrupt(format!("stored identifier is invalid: {err}")))?;
    let name = UserName::new(record.name)
        .map_err(|err| UserStoreError::corrupt(format!("stored name is invalid: {err}")))?;
    let email = EmailAddress::new(record.email)
        .map_err(|err| UserStoreError::corrupt(format!("stored email is invalid: {err}")))?;
    let age = record
        .age
        .map(|years| {
            u32::try_from(years)
                .map_err(|_| UserStoreError::corrupt(format!("stored age {years} is negative")))
                .and_then(|years| {
                    Age::new(years).map_err(|err| {
                        UserStoreError::corrupt(format!("stored age is invalid: {err}"))
                    })
                })
        })
        .transpose()?;
    Ok(User::new(id, name, email, age, record.created_at))
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserStoreError> {
        let created_at = Utc::now();
        let document = new_user_document(&user, created_at)?;
        let inserted = self
            .ops
            .insert_one(document)
            .await
            .map_err(map_operation_error)?;
        let id = match inserted {
            Bson::ObjectId(oid) => UserId::new(oid.to_hex()).map_err(|err| {
                UserStoreError::corrupt(format!("store-assigned identifier is invalid: {err}"))
            })?,
            other => {
                return Err(UserStoreError::corrupt(format!(
                    "store assigned a non-object identifier: {other}"
                )));
            }
        };
        debug!(user = %id, "user created");
        let (name, email, age) = user.into_parts();
        Ok(User::new(id, name, email, age, created_at))
    }

    async fn get_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        let filter = id_filter(id)?;
        let document = self
            .ops
            .find_one(filter)
            .await
            .map_err(map_operation_error)?
            .ok_or_else(|| UserStoreError::not_found(id.as_ref()))?;
        document_to_user(document)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserStoreError> {
        self.ops
            .find_one(doc! { "email": email.as_ref() })
            .await
            .map_err(map_operation_error)?
            .map(document_to_user)
            .transpose()
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, UserStoreError> {
        let mut stream = self
            .ops
            .find_many(doc! {}, page)
            .await
            .map_err(map_operation_error)?;
        let mut users = Vec::new();
        while let Some(item) = stream.next().await {
            let document = item.map_err(map_operation_error)?;
            users.push(document_to_user(document)?);
        }
        Ok(users)
    }

    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<u64, UserStoreError> {
        let filter = id_filter(id)?;
        let modified = self
            .ops
            .update_one(filter, patch_update(&patch))
            .await
            .map_err(map_operation_error)?;
        debug!(user = %id, modified, "user update applied");
        Ok(modified)
    }

    async fn delete(&self, id: &UserId) -> Result<u64, UserStoreError> {
        let filter = id_filter(id)?;
        let deleted = self
            .ops
            .delete_one(filter)
            .await
            .map_err(map_operation_error)?;
        debug!(user = %id, deleted, "user delete applied");
        Ok(deleted)
    }
}
