//! Store-backed readiness probe adapter.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::ReadinessProbe;

use super::factory::ClientFactory;

/// Readiness probe that pings one factory target.
///
/// Reports ready only while the target's client is cached (or creatable)
/// and the store answers a ping, so orchestrators stop routing traffic
/// the moment the session is gone.
pub struct StoreReadiness {
    factory: Arc<ClientFactory>,
    target: String,
}

impl StoreReadiness {
    /// Probe the given factory target.
    pub fn new(factory: Arc<ClientFactory>, target: impl Into<String>) -> Self {
        Self {
            factory,
            target: target.into(),
        }
    }
}

#[async_trait]
impl ReadinessProbe for StoreReadiness {
    async fn check(&self) -> bool {
        match self.factory.get_client(&self.target).await {
            Ok(client) => client.is_connected().await,
            Err(err) => {
                warn!(store_target = %self.target, error = %err, "readiness check failed");
                false
            }
        }
    }
}
