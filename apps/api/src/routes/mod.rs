pub mod health;

use axum::{middleware, routing::get, Router};

use crate::applications::handlers;
use crate::auth::require_user;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/applications",
            get(handlers::handle_list).post(handlers::handle_create),
        )
        .route(
            "/applications/:id",
            get(handlers::handle_get)
                .put(handlers::handle_update)
                .delete(handlers::handle_delete),
        )
        .route("/stats", get(handlers::handle_stats))
        .route_layer(middleware::from_fn(require_user));

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api)
        .with_state(state)
}
