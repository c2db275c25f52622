//! Router assembly.

use axum::http::{header, Method};
use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::backend::auth;
use crate::backend::middleware::require_auth;
use crate::backend::realtime::ws_handler;
use crate::backend::routes::{projects, tasks};
use crate::backend::server::AppState;

async fn health() -> &'static str {
    "ok"
}

/// Build the full application router.
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/tasks/{id}/move", put(tasks::move_task))
        .route("/api/tasks/{id}/archive", put(tasks::archive_task))
        .route("/api/tasks/{id}/comments", post(tasks::add_comment))
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/api/projects/{id}/members", post(projects::add_member))
        .route(
            "/api/projects/{id}/members/{user_id}",
            delete(projects::remove_member),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
