//! database entity models for sea-orm.
//!
//! these entities map to database tables and handle serialization
//! of enum and json types to/from plain text columns.

pub mod admin;
pub mod pledge;
pub mod security_log;
