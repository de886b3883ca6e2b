use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::answer_engine::AnswerEngine;
use crate::widgets::WidgetClient;

pub mod handlers;
pub mod models;

#[derive(Clone)]
pub struct AppState {
    pub engine: AnswerEngine,
    pub widgets: WidgetClient,
}

pub fn create_router(state: AppState) -> Router {
    // the browser front-end is served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", post(handlers::search_handler))
        .route("/weather", get(handlers::weather_handler))
        .route("/stocks", get(handlers::stocks_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
