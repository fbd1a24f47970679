use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::{validation_error_response, AppState, ErrorResponse};
use crate::domain::entity::forecast::{Forecast, ForecastCreate, ForecastFilter};
use crate::usecase::latest_forecasts::LatestForecastsError;
use crate::usecase::search_forecasts::SearchForecastsError;
use crate::usecase::upsert_forecast::UpsertForecastError;

fn symbol_not_found(symbol: &str) -> axum::response::Response {
    let err = ErrorResponse::new(
        "FIN_FORECAST_SYMBOL_NOT_FOUND",
        &format!("symbol not found: {symbol}"),
    );
    (StatusCode::NOT_FOUND, Json(err)).into_response()
}

fn internal_error(context: &str, detail: &str) -> axum::response::Response {
    tracing::error!(error = %detail, "{}", context);
    let err = ErrorResponse::new("FIN_FORECAST_INTERNAL", "Internal server error");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
}

#[utoipa::path(
    post,
    path = "/api/v1/forecasts/upsert",
    request_body = ForecastCreate,
    responses(
        (status = 200, description = "Upserted row ID"),
        (status = 404, description = "Unknown symbol", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert(
    State(state): State<AppState>,
    Json(req): Json<ForecastCreate>,
) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.upsert_forecast_uc.execute(req).await {
        Ok(id) => (StatusCode::OK, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(UpsertForecastError::SymbolNotFound(symbol)) => symbol_not_found(&symbol),
        Err(UpsertForecastError::Internal(msg)) => {
            internal_error("forecast upsert failed", &msg)
        }
    }
}

/// POST /api/v1/forecasts/bulk_upsert のリクエストボディ。
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct BulkForecastRequest {
    #[validate(length(min = 1), nested)]
    pub items: Vec<ForecastCreate>,
}

#[utoipa::path(
    post,
    path = "/api/v1/forecasts/bulk_upsert",
    request_body = BulkForecastRequest,
    responses(
        (status = 200, description = "Upserted row IDs"),
        (status = 404, description = "Unknown symbol", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn bulk_upsert(
    State(state): State<AppState>,
    Json(req): Json<BulkForecastRequest>,
) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.upsert_forecast_uc.execute_bulk(req.items).await {
        Ok(ids) => (
            StatusCode::OK,
            Json(serde_json::json!({ "count": ids.len(), "ids": ids })),
        )
            .into_response(),
        Err(UpsertForecastError::SymbolNotFound(symbol)) => symbol_not_found(&symbol),
        Err(UpsertForecastError::Internal(msg)) => {
            internal_error("forecast bulk upsert failed", &msg)
        }
    }
}

/// GET /api/v1/forecasts/latest のクエリパラメータ。
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LatestQuery {
    pub symbol: String,
    #[serde(default)]
    pub range_days: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/forecasts/latest",
    params(LatestQuery),
    responses(
        (status = 200, description = "Latest forecasts per symbol", body = [Forecast]),
        (status = 404, description = "Unknown symbol", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn latest(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> impl IntoResponse {
    match state
        .latest_forecasts_uc
        .execute(&query.symbol, query.range_days)
        .await
    {
        Ok(forecasts) => (StatusCode::OK, Json(forecasts)).into_response(),
        Err(LatestForecastsError::SymbolNotFound(symbol)) => symbol_not_found(&symbol),
        Err(LatestForecastsError::Internal(msg)) => {
            internal_error("latest forecasts query failed", &msg)
        }
    }
}

/// GET /api/v1/forecasts のクエリパラメータ。
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    pub symbol: String,
    #[serde(default)]
    pub range_days: Option<i32>,
    #[serde(default)]
    pub date_from: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub date_to: Option<chrono::NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/v1/forecasts",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching forecasts", body = [Forecast]),
        (status = 404, description = "Unknown symbol", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let filter = ForecastFilter {
        range_days: query.range_days,
        date_from: query.date_from,
        date_to: query.date_to,
    };

    match state.search_forecasts_uc.execute(&query.symbol, filter).await {
        Ok(forecasts) => (StatusCode::OK, Json(forecasts)).into_response(),
        Err(SearchForecastsError::SymbolNotFound(symbol)) => symbol_not_found(&symbol),
        Err(SearchForecastsError::Internal(msg)) => {
            internal_error("forecast search failed", &msg)
        }
    }
}
