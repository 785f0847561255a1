//! App Router

use salvo::Router;

use crate::{cloud_config, creds, healthcheck, leases, roles};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(
            Router::with_path("config")
                .get(cloud_config::get::handler)
                .post(cloud_config::write::handler)
                .delete(cloud_config::delete::handler),
        )
        .push(
            Router::with_path("roles")
                .get(roles::index::handler)
                .push(
                    Router::with_path("{name}")
                        .get(roles::get::handler)
                        .post(roles::write::handler)
                        .delete(roles::delete::handler),
                ),
        )
        .push(
            Router::with_path("creds/{name}")
                .get(creds::issue::handler)
                .post(creds::issue::handler),
        )
        .push(
            Router::with_path("leases/{id}")
                .delete(leases::revoke::handler)
                .push(Router::with_path("renew").post(leases::renew::handler)),
        )
}
