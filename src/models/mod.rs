pub mod invoice;
pub mod record;

pub use invoice::{Invoice, Item, RawValue};
pub use record::{missing_columns, FlatRecord, ItemType, TransformReport, COLUMNS};
