//! shared test utilities for api integration tests

#![allow(dead_code)] // Test utilities may not all be used in every test file

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, header};
use serde_json::Value;
use tower::ServiceExt;

use givestream::{Broadcaster, TokenKeys, password};
use givestream_db::{GivestreamDb, Store};
use givestream_types::{Admin, Config, Email, NewAdmin, Role};

/// peer address attached to every simulated request.
pub const TEST_PEER: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 40000);

/// test fixture containing the router plus handles to its shared state.
pub struct TestApp {
    pub app: Router,
    pub db: GivestreamDb,
    pub broadcaster: Broadcaster,
    pub config: Config,
}

impl TestApp {
    /// create a fixture with an in-memory database and generous limits.
    pub async fn spawn() -> Self {
        Self::with_config(test_config()).await
    }

    /// create a fixture with a caller-provided config.
    pub async fn with_config(config: Config) -> Self {
        let db = GivestreamDb::new_in_memory()
            .await
            .expect("failed to create in-memory database");
        let broadcaster = Broadcaster::new();
        let app = givestream::create_app(db.clone(), config.clone(), broadcaster.clone());

        Self {
            app,
            db,
            broadcaster,
            config,
        }
    }

    /// insert an admin account directly into the store.
    pub async fn create_admin(&self, email: &str, password: &str) -> Admin {
        let password_hash = password::hash(password).expect("failed to hash password");
        self.db
            .create_admin(&NewAdmin {
                name: "Test Admin".to_string(),
                email: Email::new(email).expect("invalid test email"),
                password_hash,
                role: Role::Admin,
            })
            .await
            .expect("failed to create admin")
    }

    /// mint a valid access token for an admin, bypassing the login flow.
    pub fn access_token_for(&self, admin: &Admin) -> String {
        TokenKeys::new(&self.config.auth)
            .mint_access(admin)
            .expect("failed to mint access token")
    }

    /// send a fully built request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(request("GET", uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            request("GET", uri)
                .header(header::AUTHORIZATION, bearer(token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response<Body> {
        self.send(
            request("POST", uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_json_auth(&self, uri: &str, token: &str, body: &Value) -> Response<Body> {
        self.send(
            request("POST", uri)
                .header(header::AUTHORIZATION, bearer(token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn put_json_auth(&self, uri: &str, token: &str, body: &Value) -> Response<Body> {
        self.send(
            request("PUT", uri)
                .header(header::AUTHORIZATION, bearer(token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            request("DELETE", uri)
                .header(header::AUTHORIZATION, bearer(token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// config with test secrets and limits high enough to stay out of the way.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.access_token_secret = "test-access-secret".to_string();
    config.auth.refresh_token_secret = "test-refresh-secret".to_string();
    config.rate_limits.auth_per_minute = 6000;
    config.rate_limits.submission_per_minute = 6000;
    config.rate_limits.read_per_minute = 6000;
    config.rate_limits.admin_per_minute = 6000;
    config
}

/// request builder with the simulated peer address already attached.
///
/// the rate limiter refuses requests without a peer address, so every
/// simulated request carries one the way a served connection would.
pub fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .extension(ConnectInfo(TEST_PEER))
}

/// format a bearer authorization header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// read and parse a json response body.
pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&body).expect("failed to parse response body")
}
