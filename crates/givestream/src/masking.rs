//! public-feed projection of pledge records.
//!
//! the public api never carries contact details. a [`MaskedPledge`]
//! keeps only what the donation wall shows; phone and email do not
//! exist in this shape at all, so no handler can leak them by accident.

use chrono::{DateTime, Utc};
use serde::Serialize;

use givestream_types::Pledge;

/// the publicly visible view of a pledge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedPledge {
    /// pledge identifier.
    pub id: u64,

    /// donor display name, absent for anonymous or erased pledges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// pledged amount in whole currency units.
    pub amount: i64,

    /// donor message, absent if none was given or it was erased.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// when the pledge was submitted.
    pub created_at: DateTime<Utc>,
}

impl From<&Pledge> for MaskedPledge {
    fn from(pledge: &Pledge) -> Self {
        Self {
            id: pledge.id.0,
            name: pledge.name.clone(),
            amount: pledge.amount,
            message: pledge.message.clone(),
            created_at: pledge.created_at,
        }
    }
}
