//! Shared types and models for the ERP purchasing console
//!
//! This crate contains the purchasing domain model shared between the backend,
//! the browser client (via WASM), and other components of the system.

pub mod models;
pub mod pricing;
pub mod types;
pub mod validation;

pub use models::*;
pub use pricing::*;
pub use types::*;
pub use validation::*;
