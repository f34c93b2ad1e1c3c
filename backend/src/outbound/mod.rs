//! Outbound adapters: implementations of domain ports against external
//! services.

pub mod persistence;
