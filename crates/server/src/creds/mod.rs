//! Credential routes

pub(crate) mod errors;
pub(crate) mod issue;
