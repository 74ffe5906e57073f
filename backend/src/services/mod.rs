//! Business logic services

pub mod alert;
pub mod delivery_note;
pub mod invoice;
pub mod payment;
pub mod purchase_order;
pub mod reporting;
pub mod withholding_tax;

pub use alert::AlertService;
pub use delivery_note::{
    DeliveryNoteService, ReceiptLineInput, ReceiveGoodsInput, UpdateDeliveryNoteInput,
};
pub use invoice::{CreateInvoiceInput, InvoiceFilter, InvoiceService, UpdateInvoiceInput};
pub use payment::{CreatePaymentInput, PaymentService, UpdatePaymentInput};
pub use purchase_order::{
    CreatePurchaseOrderInput, LineItemInput, PurchaseOrderFilter, PurchaseOrderService,
    UpdatePurchaseOrderInput,
};
pub use reporting::{PurchaseOverview, ReportingService};
pub use withholding_tax::{WithholdingTaxService, WithholdingTaxSummary};
