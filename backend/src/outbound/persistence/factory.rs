//! Lifecycle-managed cache of store clients, one per logical target.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::client::{ClientError, DocumentClient};
use super::settings::StoreSettings;

/// Failures raised by [`ClientFactory`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    /// The requested target was never registered.
    #[error("unknown store target: {target}")]
    UnknownTarget {
        /// The unregistered target name.
        target: String,
    },

    /// Connecting a client for the target failed.
    #[error("failed to connect store target {target}: {message}")]
    Connection {
        /// The target whose connection failed.
        target: String,
        /// Driver-provided failure description.
        message: String,
    },
}

impl FactoryError {
    /// Create an unknown-target error.
    pub fn unknown_target(target: impl Into<String>) -> Self {
        Self::UnknownTarget {
            target: target.into(),
        }
    }

    /// Create a connection error for the given target.
    pub fn connection(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// A client the factory can open and close.
///
/// [`DocumentClient`] is the production implementation; tests substitute a
/// stub that counts connections.
#[async_trait]
pub trait ManagedClient: Send + Sync + Sized + 'static {
    /// Open a connected client for the given settings.
    async fn open(settings: &StoreSettings) -> Result<Self, ClientError>;

    /// Close the client's session.
    async fn close(&self);
}

#[async_trait]
impl ManagedClient for DocumentClient {
    async fn open(settings: &StoreSettings) -> Result<Self, ClientError> {
        let client = Self::new(settings.clone());
        client.connect().await?;
        Ok(client)
    }

    async fn close(&self) {
        self.disconnect().await;
    }
}

type ClientCell<C> = Arc<OnceCell<Arc<C>>>;

/// Creates and caches one live client per logical target.
///
/// Targets are registered before the factory is shared; afterwards the
/// target map is immutable and only the client cache mutates. First-use
/// creation is serialised per target through an async once-cell, so two
/// concurrent `get_client` calls for one uncached target cost exactly one
/// driver session while other targets proceed unblocked. The map mutex is
/// held only to look up or remove a cell, never across a connect.
pub struct ClientFactory<C: ManagedClient = DocumentClient> {
    targets: HashMap<String, StoreSettings>,
    cells: Mutex<HashMap<String, ClientCell<C>>>,
}

impl<C: ManagedClient> ClientFactory<C> {
    /// Create a factory with no registered targets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            targets: HashMap::new(),
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Register a logical target.
    ///
    /// Requires exclusive access, so registration happens before the
    /// factory is shared; re-registering a name replaces its settings for
    /// clients created afterwards.
    pub fn register_target(&mut self, name: impl Into<String>, settings: StoreSettings) {
        self.targets.insert(name.into(), settings);
    }

    /// Names of all registered targets.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Return the cached client for `target`, connecting one on first use.
    ///
    /// Concurrent calls for the same uncached target all receive the one
    /// client the winning caller connects. A failed connect leaves the
    /// cache empty so the next call retries.
    pub async fn get_client(&self, target: &str) -> Result<Arc<C>, FactoryError> {
        let settings = self
            .targets
            .get(target)
            .ok_or_else(|| FactoryError::unknown_target(target))?;

        let cell = {
            let mut cells = self.lock_cells();
            Arc::clone(cells.entry(target.to_owned()).or_default())
        };

        let client = cell
            .get_or_try_init(|| async {
                debug!(store_target = target, "connecting store client");
                C::open(settings).await.map(Arc::new)
            })
            .await
            .map_err(|err| FactoryError::connection(target, err.to_string()))?;
        Ok(Arc::clone(client))
    }

    /// Disconnect and evict the cached client for `target`.
    ///
    /// A later `get_client` for the same target creates a fresh client.
    /// Unknown or never-connected targets are a no-op.
    pub async fn release(&self, target: &str) {
        let cell = self.lock_cells().remove(target);
        if let Some(cell) = cell {
            if let Some(client) = cell.get() {
                client.close().await;
                debug!(store_target = target, "released store client");
            }
        }
    }

    /// Disconnect and evict every cached client.
    pub async fn release_all(&self) {
        let cells: Vec<(String, ClientCell<C>)> = self.lock_cells().drain().collect();
        for (target, cell) in cells {
            if let Some(client) = cell.get() {
                client.close().await;
                debug!(store_target = target, "released store client");
            }
        }
    }

    fn lock_cells(&self) -> MutexGuard<'_, HashMap<String, ClientCell<C>>> {
        // A poisoned lock only means another thread panicked holding it;
        // the map of cells is still structurally sound.
        self.cells.lock().unwrap_or_else(|poisoned| {
            warn!("store client cache lock was poisoned");
            poisoned.into_inner()
        })
    }
}

impl<C: ManagedClient> Default for ClientFactory<C> {
    fn default() -> Self {
        Self::new()
    }
}
