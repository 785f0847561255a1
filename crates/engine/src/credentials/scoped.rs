//! Temporary instance admin keys.
//!
//! Instance keys can only be created or deleted with an admin key belonging to
//! that instance. One is minted for every such operation, used once and deleted
//! straight after, whatever the outcome of the operation.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::{
    cloud::{CloudApi, InstanceApi, ScopedInstanceClient},
    credentials::CredentialsError,
};

/// Lifetime of a temporary admin key. Upstream expires it on its own after this.
pub const SCOPED_ADMIN_TTL: Duration = Duration::from_secs(30);

/// Name prefix of temporary admin keys, distinct from issued `<role>_<uuid>` names.
pub const SCOPED_ADMIN_NAME_PREFIX: &str = "grafana-cloud-secrets-tmp-";

/// Run `operation` against `instance` with a temporary admin key.
///
/// The key is deleted once `operation` completes. If the returned future is
/// dropped before that, deletion is spawned on the current runtime.
pub(crate) async fn with_scoped_admin<T, F, Fut>(
    cloud: &dyn CloudApi,
    instance: &str,
    operation: F,
) -> Result<T, CredentialsError>
where
    F: FnOnce(Arc<dyn InstanceApi>) -> Fut,
    Fut: Future<Output = Result<T, CredentialsError>>,
{
    let client = cloud
        .create_instance_scoped_client(instance, SCOPED_ADMIN_NAME_PREFIX, SCOPED_ADMIN_TTL)
        .await
        .map_err(|source| CredentialsError::ScopedAdmin {
            instance: instance.to_string(),
            source,
        })?;

    let api = Arc::clone(client.api());
    let admin = ScopedAdmin::new(instance, client);

    let result = operation(api).await;

    admin.release().await;

    result
}

/// Owns a temporary admin key until it is deleted.
struct ScopedAdmin {
    instance: String,
    client: Option<ScopedInstanceClient>,
}

impl ScopedAdmin {
    fn new(instance: &str, client: ScopedInstanceClient) -> Self {
        Self {
            instance: instance.to_string(),
            client: Some(client),
        }
    }

    async fn release(mut self) {
        if let Some(client) = &self.client {
            delete_admin_key(&self.instance, client).await;
        }

        self.client = None;
    }
}

impl Drop for ScopedAdmin {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };

        let instance = std::mem::take(&mut self.instance);

        match Handle::try_current() {
            Ok(handle) => {
                debug!(
                    instance,
                    admin_key_id = client.admin_key_id(),
                    "scheduling scoped admin key deletion"
                );

                handle.spawn(async move {
                    delete_admin_key(&instance, &client).await;
                });
            }
            Err(error) => warn!(
                instance,
                admin_key_id = client.admin_key_id(),
                %error,
                "no runtime to delete scoped admin key, leaving it to expire"
            ),
        }
    }
}

async fn delete_admin_key(instance: &str, client: &ScopedInstanceClient) {
    match client.release().await {
        Ok(()) => debug!(
            instance,
            admin_key_id = client.admin_key_id(),
            "deleted scoped admin key"
        ),
        Err(error) => warn!(
            instance,
            admin_key_id = client.admin_key_id(),
            %error,
            "failed to delete scoped admin key"
        ),
    }
}
