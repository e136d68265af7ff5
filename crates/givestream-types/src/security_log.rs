//! append-only security audit events.
//!
//! every security-relevant action (auth attempts, pledge mutations, socket
//! lifecycle, rate-limit trips) is persisted here regardless of whether the
//! triggering request succeeded. entries expire after a fixed retention
//! period; no documented endpoint ever reads them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// how long security log entries are retained before the sweeper removes them.
pub const SECURITY_LOG_RETENTION_DAYS: i64 = 365;

/// the kind of security-relevant event being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityEventKind {
    /// a login attempt (detail records success or failure).
    Login,
    /// an explicit logout.
    Logout,
    /// an access token was reissued from a refresh token.
    TokenRefresh,
    /// a presented token failed verification.
    TokenInvalid,
    /// a public pledge submission.
    PledgeSubmit,
    /// an admin edited a pledge.
    PledgeUpdate,
    /// pii erasure was applied to a pledge.
    PledgeErase,
    /// some other authenticated admin action (e.g. export).
    AdminAction,
    /// a request was rejected by a rate limiter.
    RateLimit,
    /// anomalous input worth flagging.
    Suspicious,
    /// an unauthenticated or unauthorized access attempt.
    Unauthorized,
    /// a realtime client connected.
    SocketConnect,
    /// a realtime client disconnected.
    SocketDisconnect,
    /// a realtime connection failed.
    SocketError,
    /// a broadcast attempt failed.
    SocketBroadcast,
}

impl SecurityEventKind {
    /// the event kind as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventKind::Login => "login",
            SecurityEventKind::Logout => "logout",
            SecurityEventKind::TokenRefresh => "token-refresh",
            SecurityEventKind::TokenInvalid => "token-invalid",
            SecurityEventKind::PledgeSubmit => "pledge-submit",
            SecurityEventKind::PledgeUpdate => "pledge-update",
            SecurityEventKind::PledgeErase => "pledge-erase",
            SecurityEventKind::AdminAction => "admin-action",
            SecurityEventKind::RateLimit => "rate-limit",
            SecurityEventKind::Suspicious => "suspicious",
            SecurityEventKind::Unauthorized => "unauthorized",
            SecurityEventKind::SocketConnect => "socket-connect",
            SecurityEventKind::SocketDisconnect => "socket-disconnect",
            SecurityEventKind::SocketError => "socket-error",
            SecurityEventKind::SocketBroadcast => "socket-broadcast",
        }
    }
}

impl std::fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SecurityEventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(SecurityEventKind::Login),
            "logout" => Ok(SecurityEventKind::Logout),
            "token-refresh" => Ok(SecurityEventKind::TokenRefresh),
            "token-invalid" => Ok(SecurityEventKind::TokenInvalid),
            "pledge-submit" => Ok(SecurityEventKind::PledgeSubmit),
            "pledge-update" => Ok(SecurityEventKind::PledgeUpdate),
            "pledge-erase" => Ok(SecurityEventKind::PledgeErase),
            "admin-action" => Ok(SecurityEventKind::AdminAction),
            "rate-limit" => Ok(SecurityEventKind::RateLimit),
            "suspicious" => Ok(SecurityEventKind::Suspicious),
            "unauthorized" => Ok(SecurityEventKind::Unauthorized),
            "socket-connect" => Ok(SecurityEventKind::SocketConnect),
            "socket-disconnect" => Ok(SecurityEventKind::SocketDisconnect),
            "socket-error" => Ok(SecurityEventKind::SocketError),
            "socket-broadcast" => Ok(SecurityEventKind::SocketBroadcast),
            other => Err(Error::UnknownVariant {
                kind: "security event",
                value: other.to_string(),
            }),
        }
    }
}

/// a stored security log entry.
#[derive(Debug, Clone)]
pub struct SecurityLog {
    /// unique identifier.
    pub id: u64,

    /// what happened.
    pub event: SecurityEventKind,

    /// who did it, when known (admin email or id).
    pub actor: Option<String>,

    /// client address the request originated from.
    pub origin: String,

    /// free-form structured detail.
    pub detail: serde_json::Value,

    /// when the event occurred.
    pub created_at: DateTime<Utc>,
}

/// a security log entry waiting to be appended.
#[derive(Debug, Clone)]
pub struct NewSecurityLog {
    /// what happened.
    pub event: SecurityEventKind,

    /// who did it, when known.
    pub actor: Option<String>,

    /// client address the request originated from.
    pub origin: String,

    /// free-form structured detail.
    pub detail: serde_json::Value,
}

impl NewSecurityLog {
    /// build an entry with an empty detail payload.
    pub fn new(event: SecurityEventKind, origin: impl Into<String>) -> Self {
        Self {
            event,
            actor: None,
            origin: origin.into(),
            detail: serde_json::Value::Null,
        }
    }

    /// attach an actor identifier.
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// attach a detail payload.
    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}
