pub mod flattener;
pub mod parse;

pub use flattener::{Flattened, InvoiceFlattener};
