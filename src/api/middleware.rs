//! Request throttling middleware.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::handlers::AppState;
use crate::error::{ApiError, Result};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Admits the request only if the client is still within its quota.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let client = client_id(&request, state.trust_forwarded_for);

    if !state.limiter.allow(&client) {
        warn!(client = %client, "Rate limit exceeded");
        return Err(ApiError::RateLimited(client));
    }

    Ok(next.run(request).await)
}

/// Identifies the caller by its peer address, or `"unknown"` when the
/// connection info is missing.
///
/// With `trust_forwarded_for` set, the first `X-Forwarded-For` hop wins over
/// the peer address. The header is client-controlled, so this is only sound
/// behind a proxy that overwrites it.
pub fn client_id(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
