//! HTTP request handlers

pub mod alert;
pub mod delivery_note;
pub mod health;
pub mod invoice;
pub mod payment;
pub mod purchase_order;
pub mod reporting;
pub mod withholding_tax;

pub use alert::*;
pub use delivery_note::*;
pub use health::*;
pub use invoice::*;
pub use payment::*;
pub use purchase_order::*;
pub use reporting::*;
pub use withholding_tax::*;
