//! Storage-shape structs for the document store.
//!
//! Internal to the persistence layer: the domain never sees these, and
//! repositories own the fallible translation in both directions.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored shape of a user record in the `users` collection.
///
/// `_id` is absent on insert so the store assigns it; every read is
/// expected to carry one. `created_at` is stored as a native BSON
/// datetime, not a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}
