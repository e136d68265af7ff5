//! givestream library - HTTP handlers and application setup.
//!
//! this crate provides the http server and handlers for the givestream
//! donation platform:
//! - [`handlers`]: http request handlers for the public and admin api
//! - [`broadcaster`]: room-scoped realtime event fan-out
//! - [`rate_limit`]: per-class request rate limiting
//! - [`tokens`]: access/refresh token minting and verification
//! - [`security`]: append-only security log writer and retention sweeper
//! - [`cli`]: command-line interface implementation

#![warn(missing_docs)]

/// room-scoped realtime event fan-out.
pub mod broadcaster;
/// command-line interface implementation.
pub mod cli;
/// http request handlers for the public and admin api.
pub mod handlers;
mod masking;
/// password hashing and verification.
pub mod password;
/// per-class request rate limiting.
pub mod rate_limit;
/// security log writer and retention sweeper.
pub mod security;
/// access/refresh token minting and verification.
pub mod tokens;

pub use broadcaster::{Broadcaster, Event};
pub use masking::MaskedPledge;
pub use security::{SecurityLogSweeper, SecurityLogWriter};
pub use tokens::TokenKeys;

use axum::http::{HeaderValue, Method, header};
use axum::routing::{delete, get, post};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tracing::warn;

use givestream_db::GivestreamDb;
use givestream_types::Config;

use rate_limit::{RateLimitClass, TrustedProxyKeyExtractor, rate_limited, record_rate_limit_trips};

/// shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// database handle.
    pub db: GivestreamDb,
    /// server configuration.
    pub config: Config,
    /// realtime event rooms.
    pub broadcaster: Broadcaster,
    /// fire-and-forget security log writer.
    pub security_log: SecurityLogWriter,
    /// token minting and verification keys.
    pub token_keys: TokenKeys,
    /// proxy-aware client ip resolution.
    pub key_extractor: TrustedProxyKeyExtractor,
}

/// create the axum application with all routes.
///
/// the broadcaster is taken as a parameter rather than constructed here
/// so the caller can keep a handle for subscribing or injecting events.
pub fn create_app(db: GivestreamDb, config: Config, broadcaster: Broadcaster) -> Router {
    let token_keys = TokenKeys::new(&config.auth);
    let security_log = SecurityLogWriter::new(db.clone());
    let key_extractor = TrustedProxyKeyExtractor::new(&config.trusted_proxies);

    let auth_rpm = config.rate_limits.auth_per_minute;
    let submission_rpm = config.rate_limits.submission_per_minute;
    let read_rpm = config.rate_limits.read_per_minute;
    let admin_rpm = config.rate_limits.admin_per_minute;
    let origins = config.cors_origins.clone();

    let state = AppState {
        db,
        config,
        broadcaster,
        security_log,
        token_keys,
        key_extractor: key_extractor.clone(),
    };

    let auth_routes = rate_limited(
        Router::new()
            .route("/api/auth/login", post(handlers::login))
            .route("/api/auth/refresh", post(handlers::refresh))
            .route("/api/auth/logout", post(handlers::logout)),
        RateLimitClass::Auth,
        auth_rpm,
        key_extractor.clone(),
    );

    let submission_routes = rate_limited(
        Router::new().route("/api/pledges", post(handlers::submit_pledge)),
        RateLimitClass::Submission,
        submission_rpm,
        key_extractor.clone(),
    );

    let read_routes = rate_limited(
        Router::new()
            .route("/api/pledges/public", get(handlers::public_feed))
            .route("/api/pledges/stats", get(handlers::pledge_stats)),
        RateLimitClass::Read,
        read_rpm,
        key_extractor.clone(),
    );

    let admin_routes = rate_limited(
        Router::new()
            .route("/api/pledges", get(handlers::list_pledges))
            .route("/api/pledges/excel", get(handlers::export_pledges))
            .route(
                "/api/pledges/{id}",
                get(handlers::get_pledge).put(handlers::update_pledge),
            )
            .route("/api/pledges/{id}/erase", delete(handlers::erase_pledge)),
        RateLimitClass::Admin,
        admin_rpm,
        key_extractor,
    );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/events", get(handlers::events))
        .merge(auth_routes)
        .merge(submission_routes)
        .merge(read_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            record_rate_limit_trips,
        ))
        .layer(cors_layer(&origins))
        .with_state(state)
}

/// build the cors layer from the configured origin list.
///
/// invalid entries are skipped with a warning; an empty list leaves the
/// default (inert) layer in place, which suits single-origin deployments
/// where the api serves the frontend.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = trimmed, "ignoring invalid cors origin");
                    None
                }
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}
