//! Domain models for the purchasing workflow
//!
//! Purchase order -> delivery note -> supplier invoice -> payment -> withholding tax,
//! with payment alerts derived from the invoice ledger.

mod alert;
mod delivery_note;
mod invoice;
mod payment;
mod purchase_order;
mod withholding_tax;

pub use alert::*;
pub use delivery_note::*;
pub use invoice::*;
pub use payment::*;
pub use purchase_order::*;
pub use withholding_tax::*;
