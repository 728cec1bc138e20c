//! Credential extraction middleware.

use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::domain::entities::Credential;
use crate::error::AppError;

/// Requires an `Authorization` header and stores the parsed [`Credential`]
/// in the request extensions.
///
/// # Header Format
///
/// ```text
/// Authorization: <scheme> <token>
/// ```
///
/// Any scheme is accepted; the credential is forwarded to the upstream API,
/// which is the one deciding whether it is valid.
///
/// # Errors
///
/// Returns `401 Unauthorized` with body `Unauthorized\n` if the header is
/// missing, not valid UTF-8, or lacks either part. No upstream call is made.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/v1/clicks/country", get(country_clicks_handler))
///     .route_layer(middleware::from_fn(auth::layer));
/// ```
pub async fn layer(mut req: Request, next: Next) -> Result<Response, AppError> {
    let credential = credential_from_headers(req.headers()).ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(credential);

    Ok(next.run(req).await)
}

fn credential_from_headers(headers: &HeaderMap) -> Option<Credential> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    Credential::parse(value)
}
