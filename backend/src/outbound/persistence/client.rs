//! One logical driver session against a configured store target.

use mongodb::bson::{Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::settings::StoreSettings;

/// Failures raised by [`DocumentClient`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The session could not be established or verified.
    #[error("failed to connect to document store: {message}")]
    Connect {
        /// Driver-provided failure description.
        message: String,
    },

    /// An operation was attempted before `connect` succeeded.
    #[error("document store client is not connected")]
    NotConnected,

    /// A command failed after the session was established.
    #[error("document store command failed: {message}")]
    Command {
        /// Driver-provided failure description.
        message: String,
    },
}

impl ClientError {
    /// Create a connect error with the given message.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Create a command error with the given message.
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }
}

/// Owns one driver session for a single logical target.
///
/// The handle is absent until [`DocumentClient::connect`] succeeds and
/// again after [`DocumentClient::disconnect`]. The driver multiplexes its
/// own connection pool behind the handle; this type only manages the
/// session lifecycle and scopes commands to the configured database.
pub struct DocumentClient {
    settings: StoreSettings,
    handle: RwLock<Option<Client>>,
}

impl DocumentClient {
    /// Create a disconnected client for the given settings.
    #[must_use]
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            handle: RwLock::new(None),
        }
    }

    /// Settings this client was built from.
    #[must_use]
    pub const fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Establish the driver session, verifying it with a `ping`.
    ///
    /// Reuses the existing session when already connected. Fails with
    /// [`ClientError::Connect`] when the target is unreachable or rejects
    /// the handshake; no handle is published in that case.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let mut guard = self.handle.write().await;
        if guard.is_some() {
            return Ok(());
        }

        let mut options = ClientOptions::parse(self.settings.uri())
            .await
            .map_err(|err| ClientError::connect(err.to_string()))?;
        options.max_pool_size = Some(self.settings.max_pool_size());
        options.min_pool_size = Some(self.settings.min_pool_size());
        options.connect_timeout = Some(self.settings.connect_timeout());
        options.server_selection_timeout = Some(self.settings.server_selection_timeout());
        options.max_idle_time = Some(self.settings.max_idle_time());

        let client =
            Client::with_options(options).map_err(|err| ClientError::connect(err.to_string()))?;
        client
            .database(self.settings.database())
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| ClientError::connect(err.to_string()))?;

        info!(database = self.settings.database(), "document store session established");
        *guard = Some(client);
        Ok(())
    }

    /// Tear the session down. Safe to call when already disconnected.
    pub async fn disconnect(&self) {
        let taken = self.handle.write().await.take();
        if let Some(client) = taken {
            client.shutdown().await;
            debug!(database = self.settings.database(), "document store session closed");
        }
    }

    /// Whether the session is up and the store answers a `ping`.
    pub async fn is_connected(&self) -> bool {
        let Some(client) = self.current().await else {
            return false;
        };
        client
            .database(self.settings.database())
            .run_command(doc! { "ping": 1 })
            .await
            .is_ok()
    }

    /// Run one database-level command and return the raw reply.
    pub async fn run_command(&self, command: Document) -> Result<Document, ClientError> {
        let client = self.current().await.ok_or(ClientError::NotConnected)?;
        client
            .database(self.settings.database())
            .run_command(command)
            .await
            .map_err(|err| ClientError::command(err.to_string()))
    }

    /// Handle to a collection in the configured database.
    pub async fn collection(&self, name: &str) -> Result<Collection<Document>, ClientError> {
        let client = self.current().await.ok_or(ClientError::NotConnected)?;
        Ok(client.database(self.settings.database()).collection(name))
    }

    async fn current(&self) -> Option<Client> {
        self.handle.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    //! Lifecycle coverage that does not require a live store.
    use super::{ClientError, DocumentClient};
    use crate::outbound::persistence::settings::StoreSettings;

    fn settings() -> StoreSettings {
        StoreSettings::new("mongodb://localhost:27017", "appdb").expect("valid settings")
    }

    #[tokio::test]
    async fn fresh_client_reports_disconnected() {
        let client = DocumentClient::new(settings());
        assert!(!client.is_connected().await);
    }

    #[tokio::test]
    async fn commands_require_a_session() {
        let client = DocumentClient::new(settings());
        let result = client
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await;
        assert_eq!(result, Err(ClientError::NotConnected));
        assert!(client.collection("users").await.is_err());
    }

    #[tokio::test]
    async fn disconnect_is_idempotent_without_a_session() {
        let client = DocumentClient::new(settings());
        client.disconnect().await;
        client.disconnect().await;
        assert!(!client.is_connected().await);
    }
}
