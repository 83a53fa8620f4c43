//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&MySqlPool` as the first argument.

pub mod partner_repo;
pub mod user_repo;

pub use partner_repo::PartnerRepo;
pub use user_repo::UserRepo;
