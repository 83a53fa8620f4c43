//! Domain logic for the partner roster: field normalization, the partner
//! record shape, the filter engine, and spreadsheet import/export.
//!
//! Nothing in this crate touches the network or the database.

pub mod error;
pub mod filter;
pub mod importer;
pub mod normalize;
pub mod partner;
pub mod spreadsheet;
pub mod types;
