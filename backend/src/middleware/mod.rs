//! Request extractors

pub mod acting_user;

pub use acting_user::{ActingUser, ACTING_USER_HEADER};
