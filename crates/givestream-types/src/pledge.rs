//! pledge type representing a single donation record.
//!
//! pledges are created by public submission, reviewed by admins, and only
//! confirmed pledges appear in public feeds. records are never physically
//! deleted; pii erasure redacts contact fields on a retained record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::phone::ERASED_PHONE_SENTINEL;
use crate::{DisplayName, Email, Error, PhoneNumber};

/// maximum length of the free-text message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// unique identifier for a pledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PledgeId(pub u64);

impl From<u64> for PledgeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PledgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// moderation status of a pledge.
///
/// every pledge starts out `pending`. admins may set any status from any
/// other; no transition ordering is enforced beyond the enum itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PledgeStatus {
    /// submitted, awaiting review.
    #[default]
    Pending,
    /// reviewed and accepted; visible in public feeds.
    Confirmed,
    /// reviewed and declined; never shown publicly.
    Rejected,
}

impl PledgeStatus {
    /// all statuses, for aggregation and option listings.
    pub const ALL: [PledgeStatus; 3] = [
        PledgeStatus::Pending,
        PledgeStatus::Confirmed,
        PledgeStatus::Rejected,
    ];

    /// the status as its stored/wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PledgeStatus::Pending => "pending",
            PledgeStatus::Confirmed => "confirmed",
            PledgeStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for PledgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PledgeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PledgeStatus::Pending),
            "confirmed" => Ok(PledgeStatus::Confirmed),
            "rejected" => Ok(PledgeStatus::Rejected),
            other => Err(Error::UnknownVariant {
                kind: "pledge status",
                value: other.to_string(),
            }),
        }
    }
}

/// how the donor intends to (or did) pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// payment already received.
    Received,
    /// payment promised for later.
    #[default]
    Pledged,
}

impl PaymentMethod {
    /// all payment methods, for aggregation.
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::Received, PaymentMethod::Pledged];

    /// the payment method as its stored/wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Received => "received",
            PaymentMethod::Pledged => "pledged",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(PaymentMethod::Received),
            "pledged" => Ok(PaymentMethod::Pledged),
            other => Err(Error::UnknownVariant {
                kind: "payment method",
                value: other.to_string(),
            }),
        }
    }
}

/// a stored donation record.
///
/// contact fields are plain strings here because erased records must remain
/// representable (`phone` holds the erasure sentinel, name/email/message are
/// gone entirely). wire representations are built at the api layer, which is
/// the only place masking decisions are made.
#[derive(Debug, Clone, PartialEq)]
pub struct Pledge {
    /// unique identifier, assigned at creation.
    pub id: PledgeId,

    /// donor display name, if given and not erased.
    pub name: Option<String>,

    /// donor contact email, if given and not erased.
    pub email: Option<String>,

    /// donor contact phone, or the erasure sentinel.
    pub phone: String,

    /// amount in whole currency units, always >= 1.
    pub amount: i64,

    /// free-text message from the donor, if given and not erased.
    pub message: Option<String>,

    /// moderation status.
    pub status: PledgeStatus,

    /// how the donor pays.
    pub payment_method: PaymentMethod,

    /// when the pledge was submitted.
    pub created_at: DateTime<Utc>,

    /// when the pledge was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Pledge {
    /// whether pii erasure has been applied to this record.
    pub fn is_erased(&self) -> bool {
        self.phone == ERASED_PHONE_SENTINEL
    }

    /// whether this pledge appears in public feeds.
    pub fn is_confirmed(&self) -> bool {
        self.status == PledgeStatus::Confirmed
    }
}

/// a validated pledge submission, ready to persist.
///
/// construction goes through the validated newtypes, so a `NewPledge` always
/// satisfies the submission rules (the amount bound is checked by the
/// validation layer before this is built).
#[derive(Debug, Clone)]
pub struct NewPledge {
    /// donor display name.
    pub name: Option<DisplayName>,

    /// donor contact email.
    pub email: Option<Email>,

    /// donor contact phone, required at submission.
    pub phone: PhoneNumber,

    /// amount in whole currency units.
    pub amount: i64,

    /// free-text message.
    pub message: Option<String>,

    /// donor-selected payment method.
    pub payment_method: PaymentMethod,
}

/// a partial admin update: present fields are applied, absent fields are
/// left unchanged.
#[derive(Debug, Clone, Default)]
pub struct PledgeChanges {
    /// new moderation status.
    pub status: Option<PledgeStatus>,

    /// new payment method.
    pub payment_method: Option<PaymentMethod>,

    /// new display name.
    pub name: Option<DisplayName>,

    /// new message text.
    pub message: Option<String>,

    /// corrected amount.
    pub amount: Option<i64>,
}

impl PledgeChanges {
    /// true when no field is being changed.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.payment_method.is_none()
            && self.name.is_none()
            && self.message.is_none()
            && self.amount.is_none()
    }
}

/// per-status record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// records with status `pending`.
    pub pending: u64,
    /// records with status `confirmed`.
    pub confirmed: u64,
    /// records with status `rejected`.
    pub rejected: u64,
}

/// per-payment-method record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaymentMethodCounts {
    /// records marked `received`.
    pub received: u64,
    /// records marked `pledged`.
    pub pledged: u64,
}

/// aggregate statistics over the whole pledge store.
///
/// always produced by a full recount at query time; nothing is maintained
/// incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeStats {
    /// number of confirmed pledges.
    pub total_confirmed_count: u64,

    /// sum of confirmed pledge amounts.
    pub total_confirmed_amount_sum: i64,

    /// record counts per status.
    pub counts_by_status: StatusCounts,

    /// record counts per payment method.
    pub counts_by_payment_method: PaymentMethodCounts,
}

/// which column an admin listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PledgeSortField {
    /// submission time (the default).
    #[default]
    CreatedAt,
    /// last modification time.
    UpdatedAt,
    /// pledge amount.
    Amount,
}

/// listing sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// ascending.
    Asc,
    /// descending (the default; newest or largest first).
    #[default]
    Desc,
}

/// parameters for the paginated admin listing.
#[derive(Debug, Clone)]
pub struct PledgeQuery {
    /// 1-based page number.
    pub page: u64,

    /// records per page.
    pub limit: u64,

    /// restrict to a single status.
    pub status: Option<PledgeStatus>,

    /// sort column.
    pub sort_by: PledgeSortField,

    /// sort direction.
    pub order: SortOrder,
}

impl Default for PledgeQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            status: None,
            sort_by: PledgeSortField::default(),
            order: SortOrder::default(),
        }
    }
}
