//! mafnexus-common — Shared record model, MAF table I/O and errors used across all mafnexus crates.

pub mod error;
pub mod record;
pub mod maf;

// Re-export commonly used types
pub use error::{MafNexusError, Result};
pub use maf::{write_maf, MafTable, REQUIRED_COLUMNS};
pub use record::{ExtensionMap, MafColumn, Record};
