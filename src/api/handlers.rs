use axum::{
    Json,
    extract::{Query as QueryString, State, rejection::JsonRejection},
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::data_models::{AIResponse, QUERY_REQUIRED, Query};
use crate::errors::{AppError, WidgetError};
use crate::widgets::{StockQuote, WeatherReport};

use super::AppState;
use super::models::{SearchRequest, WeatherParams};

pub async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<AIResponse>, AppError> {
    let request_id = nanoid::nanoid!(10);
    let span = tracing::info_span!("search", %request_id);

    async move {
        let query = parse_query(payload)?;
        log::info!("search request: {:?}", query.as_str());

        // Cancelled when this handler is dropped, e.g. on client disconnect.
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();

        let engine = state.engine.clone();
        let task = tokio::spawn(
            async move { engine.answer(&query, &cancel).await }.in_current_span(),
        );

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(AppError::Unexpected(e.into())),
        };

        result.map(Json).inspect_err(|e| {
            log::error!("search failed at {} step: {:?}", e.step(), e);
        })
    }
    .instrument(span)
    .await
}

fn parse_query(payload: Result<Json<SearchRequest>, JsonRejection>) -> Result<Query, AppError> {
    match payload {
        Ok(Json(SearchRequest { query: Some(raw) })) => Query::new(&raw),
        Ok(_) => Err(AppError::Validation(QUERY_REQUIRED.to_string())),
        Err(rejection) => {
            log::warn!("rejected search body: {}", rejection.body_text());
            Err(AppError::Validation(QUERY_REQUIRED.to_string()))
        }
    }
}

pub async fn weather_handler(
    State(state): State<AppState>,
    QueryString(params): QueryString<WeatherParams>,
) -> Result<Json<WeatherReport>, WidgetError> {
    let (lat, lon) = params
        .coordinates()
        .ok_or(WidgetError::MissingCoordinates)?;

    state
        .widgets
        .weather(lat, lon)
        .await
        .map(Json)
        .inspect_err(|e| log::error!("weather error: {:?}", e))
}

pub async fn stocks_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<StockQuote>>, WidgetError> {
    state
        .widgets
        .stocks()
        .await
        .map(Json)
        .inspect_err(|e| log::error!("stocks error: {:?}", e))
}
