//! Ports: capability traits the domain expects adapters to satisfy.

mod readiness;
mod user_repository;

pub use readiness::ReadinessProbe;
pub use user_repository::{UserRepository, UserStoreError};

#[cfg(test)]
pub use user_repository::MockUserRepository;
