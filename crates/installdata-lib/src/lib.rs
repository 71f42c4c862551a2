//! Validation for the `installData.json` mod listing.
//!
//! The listing is hand-authored, so everything here is about catching mistakes
//! before the installer sees them:
//!
//! - [`decode`] strictly maps JSON onto the [`schema`] types and rejects unknown keys
//! - [`check`] runs the cross-field consistency passes over a decoded listing
//! - [`reachability`] confirms every referenced URL can actually be fetched
//! - [`report`] turns all of the above into human-readable diagnostics

pub mod check;
pub mod config;
pub mod decode;
pub mod reachability;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use check::{check_document, collect_urls, CheckOptions, CoverageMode, UrlIndex, Violation};
pub use decode::{decode_install_data, DecodeError, KeyPath, PathSegment, PedanticDecoder};
pub use reachability::{ProbeConfig, ReachabilityChecker, ReachabilityReport};
pub use report::ValidationReport;
pub use schema::InstallDataDefinition;
