//! User service library modules.
//!
//! The crate is split along its adapter seams: [`domain`] holds the
//! transport-agnostic model, errors, and ports; [`inbound`] adapts HTTP
//! requests onto those ports; [`outbound`] provides the document-store
//! adapters behind them.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
