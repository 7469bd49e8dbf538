//! Same-origin guard for the API and the revision stream.
//!
//! Previews are served by this server but run with an opaque origin, so a
//! request issued by preview script arrives with `Origin: null` or
//! `Sec-Fetch-Site: cross-site`. Such requests, and requests from any other
//! site, are refused with `403` before they reach a handler. Requests that
//! carry neither header (command-line clients) are let through.

use axum::extract::Request;
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Fetch metadata header sent by browsers with every request.
const SEC_FETCH_SITE: &str = "sec-fetch-site";

/// Middleware rejecting requests that do not come from the host page.
pub async fn same_origin_only(request: Request, next: Next) -> Response {
    if let Err(reason) = check_same_origin(request.headers()) {
        tracing::warn!(
            method = %request.method(),
            path = request.uri().path(),
            reason = %reason,
            "Rejected cross-origin request"
        );
        return ApiError::Forbidden(reason).into_response();
    }
    next.run(request).await
}

/// Accept a request only if it is same-origin as far as its headers tell.
///
/// `Sec-Fetch-Site` must be `same-origin` or `none` (typed into the address
/// bar). `Origin`, when present, must name this server's `Host` over
/// `http` or `https`; the opaque origin `null` never matches.
pub fn check_same_origin(headers: &HeaderMap) -> Result<(), String> {
    if let Some(site) = headers.get(SEC_FETCH_SITE) {
        let site = site.to_str().unwrap_or("unreadable");
        if !matches!(site, "same-origin" | "none") {
            return Err(format!("request is {site}"));
        }
    }

    let Some(origin) = headers.get(header::ORIGIN) else {
        return Ok(());
    };
    let origin = origin
        .to_str()
        .map_err(|e| format!("unreadable Origin header: {e}"))?;
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    let authority = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"));

    match (authority, host) {
        (Some(authority), Some(host)) if authority.eq_ignore_ascii_case(host) => Ok(()),
        _ => Err(format!("foreign origin {origin}")),
    }
}
