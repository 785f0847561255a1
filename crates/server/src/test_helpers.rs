//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};

use grafana_cloud_secrets::{
    config::MockConfigService, credentials::MockCredentialsService, roles::MockRolesService,
};

use crate::{lease_table::LeasePolicy, state::State};

/// Mocks handed to a test service. Unset expectations fail on use.
#[derive(Default)]
pub(crate) struct Mocks {
    pub config: MockConfigService,
    pub roles: MockRolesService,
    pub credentials: MockCredentialsService,
}

pub(crate) fn state(mocks: Mocks) -> Arc<State> {
    Arc::new(State::new(
        Arc::new(mocks.config),
        Arc::new(mocks.roles),
        Arc::new(mocks.credentials),
        LeasePolicy::default(),
    ))
}

pub(crate) fn service_with_state(state: Arc<State>, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(state)).push(route))
}

pub(crate) fn service(mocks: Mocks, route: Router) -> Service {
    service_with_state(state(mocks), route)
}
