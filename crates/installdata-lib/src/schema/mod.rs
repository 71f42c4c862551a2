//! The legal shape of `installData.json`.
//!
//! Each struct represents one JSON object and each enum a fixed set of strings.
//! `Option` fields may be null or missing entirely; every other field is required.

pub mod fields;
pub mod types;

pub use fields::*;
pub use types::*;
