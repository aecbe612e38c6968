//! Facet Core Library
//!
//! This crate turns one fetched web page (its `<head>` fragment, response
//! headers and embedded resource URLs) into an ordered sequence of *facets*:
//! labeled observations about the page's technology, tracking and vendor
//! stack.
//!
//! # Architecture
//!
//! Five independent extractor stages run in a fixed order over a single page.
//! Their outputs are concatenated and repeated boolean facets are collapsed.
//! All rule data lives in [`FingerprintTables`], which is built once and only
//! read afterwards; extending vendor coverage means adding table entries.
//! Extraction never fails: a head that cannot be parsed is reported as a
//! single `ParseException` facet while the other stages run as usual.
//!
//! # Modules
//!
//! - `types`: Facet, ResponseHeader, stage identifiers
//! - `url`: Embedded resource URLs and query-string access
//! - `tables`: FingerprintTables, rule types and the builder
//! - `builtin`: The default rule set
//! - `head`: HeadDocument parsing and structured head facets
//! - `grep`: Raw-text scan of the head bytes
//! - `headers`: Response header facets
//! - `embeds`: Embedded resource facets
//! - `cookies`: Cookie-name fingerprinting
//! - `dedup`: Boolean facet deduplication
//! - `metrics`: Per-stage timing hooks
//! - `pipeline`: The `compute_all` orchestration

pub mod builtin;
pub mod cookies;
pub mod dedup;
pub mod embeds;
pub mod grep;
pub mod head;
pub mod headers;
pub mod metrics;
pub mod pipeline;
pub mod tables;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use dedup::facet_dedup;
pub use head::{HeadDocument, ParseFailure};
pub use metrics::{FacetMetrics, NoopMetrics, StageStats, StageTotals};
pub use pipeline::{compute_all, FacetEngine, PageInput, DEFAULT_MAX_HEAD_BYTES};
pub use tables::{FingerprintTables, HeaderPolicy, TableError, TableStats, TablesBuilder};
pub use types::{Facet, FacetValue, ResponseHeader, Stage, Stages};
pub use url::EmbeddedResource;
