use super::{Record, record_model};

/// A line item of an invoice.
///
/// Details have no endpoint of their own; they are created and updated through the
/// `details_attributes` of the invoice that carries them.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail(Record);

pub const MUTABLE: &[&str] = &[
    "id",
    "description",
    "period",
    "price",
    "amount",
    "tax_rate_id",
    "ledger_account_id",
    "product_id",
    "row_order",
];

record_model!(Detail, "detail", MUTABLE);
