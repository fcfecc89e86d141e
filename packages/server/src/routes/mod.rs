use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

/// Upper bound on request bodies for bundle-carrying endpoints. Generous
/// relative to the bundle size limit so the limit error comes from
/// validation, not the transport.
const BUNDLE_BODY_LIMIT: usize = 32 * 1024 * 1024;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/templates", template_routes())
        .nest("/assignments", assignment_routes())
        .nest("/attempts", attempt_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn template_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::template::list_templates))
        .routes(routes!(handlers::template::get_template))
        .routes(routes!(handlers::template::create_template))
        .routes(routes!(handlers::template::edit_template))
        .layer(DefaultBodyLimit::max(BUNDLE_BODY_LIMIT))
}

fn assignment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::assignment::list_assignments))
        .routes(routes!(handlers::assignment::get_assignment))
        .routes(routes!(handlers::assignment::create_assignment))
        .routes(routes!(handlers::assignment::edit_assignment))
        .layer(DefaultBodyLimit::max(BUNDLE_BODY_LIMIT))
}

fn attempt_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::attempt::list_attempts))
        .routes(routes!(handlers::attempt::get_attempt))
        .routes(routes!(handlers::attempt::create_attempt))
        .routes(routes!(handlers::attempt::edit_attempt))
        .layer(DefaultBodyLimit::max(BUNDLE_BODY_LIMIT))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::admin::consistency_report))
        .routes(routes!(handlers::admin::repair_record))
}
