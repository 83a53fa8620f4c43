//! Row structs for the roster tables.

pub mod partner;
pub mod user;
