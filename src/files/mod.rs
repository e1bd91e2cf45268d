pub mod input;
pub mod output;

pub use input::{decode_invoices, parse_expired_ids, read_expired_ids, read_invoices, InvoiceFormat};
pub use output::{write_csv, write_records};
