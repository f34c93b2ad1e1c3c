//! Document-store persistence adapters built on the `mongodb` driver.
//!
//! The stack is layered bottom-up:
//!
//! - [`StoreSettings`]: typed, environment-sourced store configuration;
//! - [`DocumentClient`]: one logical driver session per configured target;
//! - [`ClientFactory`]: lifecycle-managed cache of clients, one per target;
//! - [`CollectionOps`]: collection-scoped CRUD primitives over opaque BSON
//!   documents;
//! - [`MongoUserRepository`]: the user-typed [`crate::domain::ports::UserRepository`]
//!   adapter translating domain values to documents and driver failures to
//!   the port error taxonomy.
//!
//! Repositories never reach past the operation layer for CRUD, and nothing
//! above this module sees a driver type.

mod client;
mod factory;
mod models;
mod mongo_user_repository;
mod operations;
mod readiness;
mod settings;

pub use client::{ClientError, DocumentClient};
pub use factory::{ClientFactory, FactoryError, ManagedClient};
pub use mongo_user_repository::{MongoUserRepository, USERS_COLLECTION};
pub use operations::{CollectionOps, DocumentStream, OperationError};
pub use readiness::StoreReadiness;
pub use settings::{EnvSource, ProcessEnv, SettingsError, StoreSettings};
