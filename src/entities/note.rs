use super::{Record, record_model};

/// A note or to-do attached to an invoice, see
/// [`Invoice::add_note`](super::Invoice::add_note).
#[derive(Debug, Clone, PartialEq)]
pub struct Note(Record);

pub const ENDPOINT: &str = "notes";

pub const MUTABLE: &[&str] = &["id", "note", "todo", "assignee_id"];

record_model!(Note, "note", MUTABLE);
