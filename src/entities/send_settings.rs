use super::{Record, record_model};

/// How an invoice is delivered, see [`Invoice::send`](super::Invoice::send).
#[derive(Debug, Clone, PartialEq)]
pub struct SendSettings(Record);

pub const ENDPOINT: &str = "send_invoice";

pub const MUTABLE: &[&str] = &[
    "delivery_method",
    "sending_scheduled",
    "deliver_ubl",
    "mergeable",
    "email_address",
    "email_message",
    "invoice_date",
];

record_model!(SendSettings, "sales_invoice_sending", MUTABLE);
