//! API router.
//!
//! Routes nest under `/api/`. Auth endpoints and the health check are
//! public; everything else requires the bearer token issued at login
//! (validated by `middleware::auth::require_doctor`).

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

/// Build router from a pre-constructed `ApiContext`.
///
/// Used by integration tests that need access to the shared context
/// (e.g. to seed sessions directly).
#[cfg(test)]
pub(crate) fn api_router_with_ctx(ctx: ApiContext) -> Router {
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes — auth middleware resolves the doctor; the
    // Extension layer must be outermost so the middleware can reach
    // ApiContext. `.with_state()` converts Router<ApiContext> → Router<()>.
    let protected = Router::new()
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::remove),
        )
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route(
            "/appointments/:id",
            get(endpoints::appointments::latest)
                .patch(endpoints::appointments::patch_status)
                .delete(endpoints::appointments::remove),
        )
        .route(
            "/appointments/:id/complete",
            post(endpoints::appointments::complete),
        )
        .route(
            "/medical-records",
            get(endpoints::medical_records::list).post(endpoints::medical_records::create),
        )
        .route("/stats", get(endpoints::stats::overview))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_doctor))
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes
    let unprotected = Router::new()
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx.clone())
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        // Browser clients call from the clinic UI's origin
        .layer(CorsLayer::permissive())
}
