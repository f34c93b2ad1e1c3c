//! Domain layer: models, validation, errors, and ports.
//!
//! Nothing in this module knows about HTTP or the document store. Inbound
//! adapters convert wire payloads into these types before any port is
//! called, and outbound adapters convert them to storage documents.

pub mod error;
pub mod pagination;
pub mod ports;
pub mod user;

pub use error::{Error, ErrorCode};
pub use pagination::Page;
pub use user::{Age, EmailAddress, NewUser, User, UserId, UserName, UserPatch, UserValidationError};
