//! Lease routes

pub(crate) mod renew;
pub(crate) mod revoke;

use salvo::prelude::{Request, StatusError};
use uuid::Uuid;

use crate::extensions::*;

fn lease_id(req: &Request) -> Result<Uuid, StatusError> {
    req.param_or_400("id")?
        .parse::<Uuid>()
        .or_400("invalid lease id")
}

fn lease_not_found() -> StatusError {
    StatusError::not_found().brief("lease not found")
}
