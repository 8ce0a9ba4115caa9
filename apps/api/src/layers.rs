//! Cross-cutting HTTP layers: CORS and security response headers.

use anyhow::{bail, Result};
use axum::{
    http::{header, request::Parts, HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use tracing::info;

use crate::auth::USER_ID_HEADER;

/// Headers set on every response unless a handler already set them.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
    (
        "strict-transport-security",
        "max-age=15552000; includeSubDomains",
    ),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-permitted-cross-domain-policies", "none"),
    ("cross-origin-opener-policy", "same-origin"),
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
];

pub fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(*name),
                HeaderValue::from_static(*value),
            ))
        })
}

/// One configured origin: an exact origin, or `scheme://*.suffix` matching any subdomain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginRule {
    Exact(String),
    Subdomain { scheme: String, suffix: String },
}

impl OriginRule {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim().trim_end_matches('/');
        let Some((scheme, host)) = raw.split_once("://") else {
            bail!("Invalid CORS origin '{raw}': missing scheme");
        };
        if let Some(suffix) = host.strip_prefix("*.") {
            if suffix.is_empty() || suffix.contains('*') {
                bail!("Invalid CORS origin pattern '{raw}'");
            }
            return Ok(OriginRule::Subdomain {
                scheme: scheme.to_ascii_lowercase(),
                suffix: format!(".{}", suffix.to_ascii_lowercase()),
            });
        }
        if host.contains('*') {
            bail!("Invalid CORS origin pattern '{raw}'");
        }
        Ok(OriginRule::Exact(raw.to_ascii_lowercase()))
    }

    pub fn matches(&self, origin: &str) -> bool {
        let origin = origin.to_ascii_lowercase();
        match self {
            OriginRule::Exact(exact) => origin == *exact,
            OriginRule::Subdomain { scheme, suffix } => origin
                .strip_prefix(scheme.as_str())
                .and_then(|rest| rest.strip_prefix("://"))
                .is_some_and(|host| host.len() > suffix.len() && host.ends_with(suffix.as_str())),
        }
    }
}

/// Permissive when no origins are configured (local development), otherwise
/// restricted to the configured rules.
pub fn build_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    if allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let rules = allowed_origins
        .iter()
        .map(|origin| OriginRule::parse(origin))
        .collect::<Result<Vec<_>>>()?;
    info!("CORS restricted to {} origin rule(s)", rules.len());

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| rules.iter().any(|rule| rule.matches(origin)))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ]))
}
