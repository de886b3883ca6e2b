pub mod answer_engine;
pub mod api;
pub mod citations;
pub mod config;
pub mod data_models;
pub mod errors;
pub mod prompt;
pub mod search_provider;
pub mod synthesizer;
pub mod widgets;

use std::sync::Arc;

use answer_engine::AnswerEngine;
use api::AppState;
use config::Config;
use search_provider::SerpApiClient;
use synthesizer::AnthropicClient;
use widgets::WidgetClient;

/// Wires the production upstream clients from configuration.
pub fn build_state(config: &Config) -> reqwest::Result<AppState> {
    let http = config.http_client()?;
    let engine = AnswerEngine::new(
        Arc::new(SerpApiClient::new(http.clone(), config.search.clone())),
        Arc::new(AnthropicClient::new(http.clone(), config.model.clone())),
    );

    Ok(AppState {
        engine,
        widgets: WidgetClient::new(http, config.widgets.clone()),
    })
}
