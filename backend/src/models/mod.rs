//! Domain models for the purchasing ledgers
//!
//! Re-exports the models from the shared crate so handlers and services see
//! one set of types, the same ones the wasm bindings serialize.

pub use shared::models::*;
pub use shared::types::Period;
