//! State

use std::sync::Arc;

use grafana_cloud_secrets::{
    Backend, config::ConfigService, credentials::CredentialsService, roles::RolesService,
};

use crate::lease_table::{LeasePolicy, LeaseTable};

pub(crate) struct State {
    pub(crate) config: Arc<dyn ConfigService>,
    pub(crate) roles: Arc<dyn RolesService>,
    pub(crate) credentials: Arc<dyn CredentialsService>,
    pub(crate) leases: LeaseTable,
}

impl State {
    #[must_use]
    pub(crate) fn new(
        config: Arc<dyn ConfigService>,
        roles: Arc<dyn RolesService>,
        credentials: Arc<dyn CredentialsService>,
        policy: LeasePolicy,
    ) -> Self {
        Self {
            config,
            roles,
            credentials,
            leases: LeaseTable::new(policy),
        }
    }

    #[must_use]
    pub(crate) fn from_backend(backend: Backend, policy: LeasePolicy) -> Arc<Self> {
        Arc::new(Self::new(
            backend.config,
            backend.roles,
            backend.credentials,
            policy,
        ))
    }
}
