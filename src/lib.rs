pub mod config;
pub mod error;
pub mod files;
pub mod format;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::{FlattenError, Result};
pub use service::{Flattened, InvoiceFlattener};
