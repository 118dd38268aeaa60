use super::composite::composite_model;
use super::{Composite, Detail, Resource};

/// A template from which MoneyBird generates sales invoices on a schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringInvoice(Composite<Detail>);

composite_model!(RecurringInvoice, Detail, "recurring_sales_invoice", &[]);

impl Resource for RecurringInvoice {
    const ENDPOINT: &'static str = "recurring_sales_invoices";
}
