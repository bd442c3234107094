use axum::{routing::get, Router};
use clinibook_config::load_config;
use clinibook_scheduling::handlers::SchedulingState;
use clinibook_scheduling::routes as scheduling_routes;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod app_state;
mod directory;

#[tokio::main]
async fn main() {
    clinibook_common::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let state = Arc::new(
        app_state::build_state(config.clone())
            .await
            .expect("Failed to build application state"),
    );

    let scheduling_state = Arc::new(SchedulingState {
        service: state.service.clone(),
    });

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Clinibook API!" }))
        .merge(scheduling_routes::routes(scheduling_state))
        .merge(directory::routes(state.clone()));

    let app = Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
