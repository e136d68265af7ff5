//! http handlers for givestream api endpoints.

mod admin_auth;
mod auth;
mod error;
mod events;
mod export;
mod health;
mod pledges;

pub use admin_auth::AdminContext;
pub use auth::{login, logout, refresh};
pub use error::{ApiError, ApiJson, ApiQuery, FieldError, OptionExt, ResultExt, success};
pub use events::events;
pub use export::export_pledges;
pub use health::health;
pub use pledges::{
    PledgeDto, erase_pledge, get_pledge, list_pledges, pledge_stats, public_feed, submit_pledge,
    update_pledge,
};
