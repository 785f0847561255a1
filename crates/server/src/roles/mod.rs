//! Role routes

pub(crate) mod delete;
mod errors;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod write;
