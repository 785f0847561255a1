//! Shared fixtures for service tests.


pub use context::TestContext;

use std::sync::Arc;

use crate::cloud::{MockInstanceApi, ScopedInstanceClient};

/// Scoped client backed by `api`, holding admin key `admin_key_id`.
pub fn scoped_client(api: MockInstanceApi, admin_key_id: i64) -> ScopedInstanceClient {
    ScopedInstanceClient::new(Arc::new(api), admin_key_id)
}
