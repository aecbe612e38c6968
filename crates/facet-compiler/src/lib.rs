//! Facet Fingerprint List Compiler
//!
//! This crate compiles line-oriented fingerprint lists into
//! [`FingerprintTables`](facet_core::FingerprintTables).

pub mod parser;
pub mod optimizer;
pub mod builder;

pub use builder::{build_tables, BuildError};
pub use optimizer::{optimize_entries, OptimizeStats};
pub use parser::{parse_fingerprint_list, ListError, TableEntry};

/// The bundled header vendor fingerprint list.
pub const VENDOR_FINGERPRINTS: &str = include_str!("../lists/vendors.fingerprints");
