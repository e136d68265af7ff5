//! rate limiting utilities with proxy-aware IP extraction.
//!
//! each route class (auth, submission, read, admin) gets its own
//! governor so a burst of public reads cannot starve logins. the key
//! extractor resolves the real client address behind a trusted reverse
//! proxy and refuses to trust X-Forwarded-For from anyone else.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ipnet::IpNet;
use serde_json::json;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::KeyExtractor;
use tower_governor::{GovernorError, GovernorLayer};

use givestream_types::{NewSecurityLog, SecurityEventKind};

use crate::AppState;

/// rate limit parameters computed from requests-per-minute config.
pub struct RateLimitParams {
    /// interval between token replenishments in milliseconds.
    pub replenish_interval_ms: u64,
    /// burst size (max tokens).
    pub burst_size: u32,
}

impl RateLimitParams {
    /// compute rate limit params from requests-per-minute.
    ///
    /// burst is ~10 seconds worth of requests, capped at 5-50.
    pub fn from_requests_per_minute(rpm: u32) -> Self {
        let replenish_interval_ms = if rpm > 0 { 60_000 / rpm as u64 } else { 1000 };
        let burst_size = (rpm / 6).clamp(5, 50);
        Self {
            replenish_interval_ms,
            burst_size,
        }
    }
}

/// route classes with independently configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitClass {
    /// login, refresh and logout.
    Auth,
    /// public pledge submission.
    Submission,
    /// public feed and stats reads.
    Read,
    /// authenticated admin endpoints.
    Admin,
}

impl RateLimitClass {
    /// the message carried by 429 responses for this class.
    pub fn message(self) -> &'static str {
        match self {
            RateLimitClass::Auth => "too many authentication attempts, try again later",
            RateLimitClass::Submission => "too many pledge submissions, try again later",
            RateLimitClass::Read | RateLimitClass::Admin => "too many requests, try again later",
        }
    }
}

/// a rate limit key extractor that securely handles reverse proxy setups
///
/// when a request comes from a trusted proxy IP, the client IP is extracted
/// from the X-Forwarded-For header. Otherwise, the peer IP is used directly
///
/// this prevents IP spoofing attacks where untrusted clients send fake
/// X-Forwarded-For headers to bypass rate limiting
#[derive(Clone)]
pub struct TrustedProxyKeyExtractor {
    /// parsed trusted proxy networks/IPs
    trusted_networks: Arc<Vec<IpNet>>,
}

impl TrustedProxyKeyExtractor {
    /// create a new extractor with the given trusted proxy addresses
    ///
    /// accepts ips and cidr ranges (e.g., "127.0.0.1", "10.0.0.0/8")
    pub fn new(trusted_proxies: &[String]) -> Self {
        let trusted_networks: Vec<IpNet> = trusted_proxies
            .iter()
            .filter_map(|s| {
                // try parsing as cidr first, then as a single IP
                s.parse::<IpNet>().ok().or_else(|| {
                    s.parse::<IpAddr>().ok().map(|ip| {
                        // convert single IP to /32 or /128 network
                        match ip {
                            IpAddr::V4(v4) => IpNet::V4(ipnet::Ipv4Net::new(v4, 32).unwrap()),
                            IpAddr::V6(v6) => IpNet::V6(ipnet::Ipv6Net::new(v6, 128).unwrap()),
                        }
                    })
                })
            })
            .collect();

        Self {
            trusted_networks: Arc::new(trusted_networks),
        }
    }

    /// check if an ip is from a trusted proxy
    fn is_trusted_proxy(&self, ip: IpAddr) -> bool {
        self.trusted_networks.iter().any(|net| net.contains(&ip))
    }

    /// resolve the effective client ip from a peer address and headers
    fn resolve(&self, peer: Option<SocketAddr>, headers: &HeaderMap) -> Option<IpAddr> {
        let peer_ip = peer?.ip();

        // only a trusted proxy gets to speak for the client
        if self.is_trusted_proxy(peer_ip) {
            if let Some(forwarded) = forwarded_ip(headers) {
                return Some(forwarded);
            }
        }

        Some(peer_ip)
    }

    /// resolve the client ip for a request already split into parts
    pub fn client_ip_from_parts(&self, parts: &Parts) -> Option<IpAddr> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0);
        self.resolve(peer, &parts.headers)
    }
}

/// extract the leftmost ip from an X-Forwarded-For header
///
/// the header format is: `X-Forwarded-For: client, proxy1, proxy2, ...`
/// we want the leftmost (client) IP
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header_str = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first_ip_str = header_str.split(',').next()?.trim();
    first_ip_str.parse::<IpAddr>().ok()
}

impl KeyExtractor for TrustedProxyKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, request: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0);

        self.resolve(peer, request.headers())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// the resolved client address of a request.
///
/// extraction never fails: a request lacking a peer address (only
/// possible with a hand-built request) falls back to the unspecified
/// address instead of rejecting.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = state
            .key_extractor
            .client_ip_from_parts(parts)
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        Ok(Self(ip))
    }
}

/// wrap a group of routes with a per-class rate limiter.
pub fn rate_limited(
    routes: Router<AppState>,
    class: RateLimitClass,
    requests_per_minute: u32,
    extractor: TrustedProxyKeyExtractor,
) -> Router<AppState> {
    let params = RateLimitParams::from_requests_per_minute(requests_per_minute);
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(extractor)
            .per_millisecond(params.replenish_interval_ms)
            .burst_size(params.burst_size)
            .error_handler(move |err| rate_limit_response(class, err))
            .finish()
            .expect("failed to build rate limiter config"),
    );
    routes.layer(GovernorLayer { config })
}

/// map a governor rejection into the standard error envelope.
fn rate_limit_response(class: RateLimitClass, err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { wait_time, .. } => {
            let body = json!({"success": false, "error": class.message()});
            let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
            if let Ok(value) = header::HeaderValue::from_str(&wait_time.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            let body = json!({"success": false, "error": "unable to identify client"});
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
        GovernorError::Other { code, msg, .. } => {
            let error = msg.unwrap_or_else(|| "rate limiter error".to_string());
            let body = json!({"success": false, "error": error});
            (code, axum::Json(body)).into_response()
        }
    }
}

/// middleware that persists rate-limit rejections to the security log.
///
/// sits outside the governor layers so it observes the 429 responses
/// they produce; the governor's own error handler has no access to the
/// request context needed for the log entry.
pub async fn record_rate_limit_trips(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let origin = state
        .key_extractor
        .extract(&request)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let response = next.run(request).await;

    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        state.security_log.record(
            NewSecurityLog::new(SecurityEventKind::RateLimit, origin)
                .detail(json!({"path": path})),
        );
    }

    response
}
