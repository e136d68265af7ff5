//! core types for givestream - a donation pledge tracking backend.
//!
//! this crate provides the fundamental data structures used throughout givestream:
//! - [`pledge`]: donation records, their statuses and aggregate statistics
//! - [`admin`]: administrator accounts
//! - [`security_log`]: append-only audit events
//! - [`config`]: application configuration
//!
//! validated newtypes ([`PhoneNumber`], [`DisplayName`], [`Email`]) enforce the
//! submission rules at the api boundary; the stored domain types keep plain
//! strings so erased records remain representable.

mod admin;
mod config;
mod display_name;
mod email;
mod error;
mod phone;
mod pledge;
mod security_log;

pub use admin::{Admin, AdminId, NewAdmin, Role};
pub use config::{AuthConfig, Config, DatabaseConfig, RateLimitConfig};
pub use display_name::{DisplayName, DisplayNameError, MAX_DISPLAY_NAME_CHARS, MIN_DISPLAY_NAME_CHARS};
pub use email::{Email, EmailError};
pub use error::Error;
pub use phone::{ERASED_PHONE_SENTINEL, PhoneNumber, PhoneNumberError};
pub use pledge::{
    MAX_MESSAGE_CHARS, NewPledge, PaymentMethod, PaymentMethodCounts, Pledge, PledgeChanges,
    PledgeId, PledgeQuery, PledgeSortField, PledgeStats, PledgeStatus, SortOrder, StatusCounts,
};
pub use security_log::{
    NewSecurityLog, SECURITY_LOG_RETENTION_DAYS, SecurityEventKind, SecurityLog,
};

/// result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;
