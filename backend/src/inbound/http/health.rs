//! Health endpoints: liveness and readiness probes for orchestration.
//!
//! Liveness is a process-local drain flag; readiness additionally asks the
//! backing store through the [`ReadinessProbe`] port, so traffic stops
//! being routed here as soon as the store session is gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};

use crate::domain::ports::ReadinessProbe;

/// Shared state for the health probes.
pub struct HealthState {
    draining: AtomicBool,
    probe: Arc<dyn ReadinessProbe>,
}

impl HealthState {
    /// Create health state over the given store probe.
    pub fn new(probe: Arc<dyn ReadinessProbe>) -> Self {
        Self {
            draining: AtomicBool::new(false),
            probe,
        }
    }

    /// Flag the process as draining so both probes start failing.
    ///
    /// Call before graceful shutdown to surface the drain early.
    pub fn begin_drain(&self) {
        self.draining.store(true, Ordering::Release);
    }

    /// Whether a drain was requested.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    async fn is_ready(&self) -> bool {
        !self.is_draining() && self.probe.check().await
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Liveness probe: 200 while the process runs, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Process is alive"),
        (status = 503, description = "Process is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(!state.is_draining())
}

/// Readiness probe: 200 only while the backing store answers a ping.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Service can handle traffic"),
        (status = 503, description = "Backing store unreachable or draining")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready().await)
}

#[cfg(test)]
mod tests {
    //! Probe behaviour with a stubbed store.
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use actix_web::{App, http::StatusCode, test as actix_test, web};
    use async_trait::async_trait;

    use super::{HealthState, live, ready};
    use crate::domain::ports::ReadinessProbe;

    struct StubProbe {
        up: AtomicBool,
    }

    #[async_trait]
    impl ReadinessProbe for StubProbe {
        async fn check(&self) -> bool {
            self.up.load(Ordering::SeqCst)
        }
    }

    fn state(up: bool) -> (web::Data<HealthState>, Arc<StubProbe>) {
        let probe = Arc::new(StubProbe {
            up: AtomicBool::new(up),
        });
        let state = web::Data::new(HealthState::new(Arc::clone(&probe) as Arc<dyn ReadinessProbe>));
        (state, probe)
    }

    async fn probe_status(state: web::Data<HealthState>, path: &str) -> StatusCode {
        let app =
            actix_test::init_service(App::new().app_data(state).service(live).service(ready))
                .await;
        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(path).to_request())
                .await;
        response.status()
    }

    #[actix_web::test]
    async fn readiness_follows_the_store() {
        let (up_state, _probe) = state(true);
        assert_eq!(probe_status(up_state, "/health/ready").await, StatusCode::OK);

        let (down_state, _probe) = state(false);
        assert_eq!(
            probe_status(down_state, "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[actix_web::test]
    async fn draining_fails_both_probes_even_with_a_healthy_store() {
        let (state, _probe) = state(true);
        state.begin_drain();
        assert_eq!(
            probe_status(state.clone(), "/health/live").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            probe_status(state, "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[actix_web::test]
    async fn live_process_reports_ok() {
        let (state, _probe) = state(false);
        assert_eq!(probe_status(state, "/health/live").await, StatusCode::OK);
    }
}
