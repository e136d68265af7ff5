//! realtime event stream over websocket.
//!
//! every connection joins the public room. a connection presenting a
//! valid admin access token additionally joins the admin room and
//! receives unmasked payloads. a token that is present but bad is
//! rejected with 401 before the upgrade completes; the socket itself
//! is send-only, incoming frames other than close are discarded.

use std::net::IpAddr;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use givestream_db::Store;
use givestream_types::{NewSecurityLog, SecurityEventKind};

use crate::AppState;
use crate::broadcaster::{Broadcaster, Event};
use crate::handlers::admin_auth::parse_bearer_token;
use crate::handlers::error::ApiError;
use crate::rate_limit::ClientIp;
use crate::security::SecurityLogWriter;

/// websocket handshake query string.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// admin access token; browsers cannot set headers on websocket
    /// requests, so the query string stands in for the bearer header.
    #[serde(default)]
    token: Option<String>,
}

/// GET /api/events - websocket upgrade into the event rooms.
pub async fn events(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Query(query): Query<EventsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = query.token.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_bearer_token)
            .map(str::to_string)
    });

    // anonymous connections are fine; a presented token must be good
    let is_admin = match token {
        None => false,
        Some(token) => {
            let reject = |reason: &str| {
                state.security_log.record(
                    NewSecurityLog::new(SecurityEventKind::TokenInvalid, ip.to_string())
                        .detail(json!({"context": "events", "reason": reason})),
                );
                ApiError::unauthorized("invalid token")
            };

            let id = state
                .token_keys
                .verify_access(&token)
                .map_err(|_| reject("verification failed"))?;
            match state.db.admin_by_id(id).await {
                Ok(Some(_)) => true,
                Ok(None) => return Err(reject("account gone")),
                Err(e) => return Err(ApiError::internal(e.to_string())),
            }
        }
    };

    state.security_log.record(
        NewSecurityLog::new(SecurityEventKind::SocketConnect, ip.to_string())
            .detail(json!({"admin": is_admin})),
    );

    let broadcaster = state.broadcaster.clone();
    let security_log = state.security_log.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, broadcaster, security_log, ip, is_admin)))
}

/// pump room events out to one connected client until it goes away.
async fn handle_socket(
    socket: WebSocket,
    broadcaster: Broadcaster,
    security_log: SecurityLogWriter,
    ip: IpAddr,
    is_admin: bool,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut public_rx = broadcaster.subscribe_public();
    let mut admin_rx = is_admin.then(|| broadcaster.subscribe_admin());

    loop {
        let admin_event = async {
            match admin_rx.as_mut() {
                Some(rx) => rx.recv().await,
                None => std::future::pending().await,
            }
        };

        let event: Event = tokio::select! {
            result = public_rx.recv() => match result {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    // slow consumer; drop the backlog and keep going
                    debug!(skipped, "event stream lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
            result = admin_event => match result {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "admin event stream lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    security_log.record(
                        NewSecurityLog::new(SecurityEventKind::SocketError, ip.to_string())
                            .detail(json!({"error": e.to_string()})),
                    );
                    break;
                }
            },
        };

        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "unserializable event dropped");
                continue;
            }
        };
        if sender.send(Message::Text(text.into())).await.is_err() {
            break;
        }
    }

    security_log.record(
        NewSecurityLog::new(SecurityEventKind::SocketDisconnect, ip.to_string())
            .detail(json!({"admin": is_admin})),
    );
}
