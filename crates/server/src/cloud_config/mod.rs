//! Backend configuration routes

pub(crate) mod delete;
mod errors;
pub(crate) mod get;
pub(crate) mod write;
