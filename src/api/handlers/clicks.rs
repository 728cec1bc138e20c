//! Handler for the per-country clicks endpoint.

use axum::{
    Extension,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::api::dto::clicks::{CountryClicksParams, CountryClicksResponse};
use crate::domain::entities::Credential;
use crate::error::AppError;
use crate::state::AppState;

/// Computes average clicks per link per country for the caller's default group.
///
/// # Endpoint
///
/// `GET /v1/clicks/country`
///
/// # Authentication
///
/// Requires `Authorization: <scheme> <token>`; the credential is forwarded to
/// the upstream API for every call made on behalf of this request.
///
/// # Query Parameters
///
/// - `unit` (optional): Time unit of the metrics window (default: `day`)
/// - `units` (optional): Number of units, `-1` for all time (default: 30)
/// - `size` (optional): Links per upstream page (default: 10, max: 100)
/// - `page` (optional): First page to list (default: 1)
///
/// # Response
///
/// ```json
/// {
///   "total": 3,
///   "api_calls": 5,
///   "results": [
///     { "average": 2.3333333, "country": "DE" },
///     { "average": 0.6666667, "country": "US" }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: `page` is 0 or `size` is out of range
/// - `401 Unauthorized`: Missing or malformed credential
/// - upstream status: The user lookup, listing or a link's metrics failed
/// - `502 Bad Gateway`: Upstream API unreachable
/// - `504 Gateway Timeout`: Request deadline exceeded
pub async fn country_clicks_handler(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Query(params): Query<CountryClicksParams>,
) -> Result<Response, AppError> {
    let query = params
        .validate_and_into_query()
        .map_err(AppError::bad_request)?;

    let report = state
        .clicks_service
        .country_averages(&credential, query)
        .await?;

    let body = serde_json::to_vec(&CountryClicksResponse::from(report))
        .map_err(|e| AppError::Encoding(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
