//! Port for backing-store readiness checks.

use async_trait::async_trait;

/// Capability to answer "can the service reach its backing store right now".
///
/// The readiness HTTP probe consults this so orchestrators stop routing
/// traffic when the store connection is gone, without the probe knowing
/// anything about the store itself.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Return `true` when the backing store answers a health check.
    async fn check(&self) -> bool;
}
