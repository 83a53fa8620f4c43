pub mod auth;
pub mod filters;
pub mod form;
pub mod import;
pub mod partners;
