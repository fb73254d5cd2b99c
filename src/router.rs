//! Router construction for the details server.

use std::path::Path;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;

/// API routes, without middleware or static files.
fn api_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/daos",
            get(handlers::daos::list_daos).post(handlers::daos::create_dao),
        )
        .route("/daos/:dao_instance_id", get(handlers::daos::get_dao))
        .route(
            "/daos/:dao_instance_id/proposals/:proposal_id/details",
            get(handlers::details::get_details).post(handlers::details::save_details),
        )
        .route("/health", get(handlers::health::health))
        .with_state(state)
}

/// Build the full router. The API is mounted at the root and again under
/// `/api`, which is where the web client points. Unknown `/api/*` paths are
/// always a JSON 404. With `static_dir` set, any other path serves the built
/// client, falling back to its `index.html`.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = api_routes(state);
    let app = Router::new()
        .merge(api.clone())
        .nest("/api", api.fallback(handlers::not_found));

    let app = match static_dir {
        Some(dir) => app.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => app
            .route("/", get(handlers::health::banner))
            .fallback(handlers::not_found),
    };

    app.layer(
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ),
    )
}
