//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they depend only
//! on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::UserRepository;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User persistence port backing the `/users` endpoints.
    pub users: Arc<dyn UserRepository>,
}

impl HttpState {
    /// Bundle the given port implementations.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}
