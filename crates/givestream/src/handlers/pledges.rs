//! pledge submission, feeds, moderation and statistics handlers.

use std::net::IpAddr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use givestream_db::{MAX_PAGE_SIZE, Store};
use givestream_types::{
    DisplayName, Email, MAX_MESSAGE_CHARS, NewPledge, NewSecurityLog, PaymentMethod, PhoneNumber,
    Pledge, PledgeChanges, PledgeId, PledgeQuery, PledgeSortField, PledgeStatus, SecurityEventKind,
    SortOrder,
};

use crate::AppState;
use crate::broadcaster::{EVENT_NEW_PLEDGE, EVENT_PLEDGE_UPDATED, EVENT_STATS_UPDATE, Event};
use crate::handlers::admin_auth::AdminContext;
use crate::handlers::error::{
    ApiError, ApiJson, ApiQuery, FieldError, OptionExt, ResultExt, success,
};
use crate::masking::MaskedPledge;
use crate::rate_limit::ClientIp;

/// feed length when the client does not ask for one.
const DEFAULT_PUBLIC_LIMIT: u64 = 50;

/// hard ceiling on the public feed length.
const MAX_PUBLIC_LIMIT: u64 = 100;

/// size of the amount-ranked snapshot returned beside the feeds.
const TOP_PLEDGE_COUNT: u64 = 5;

/// full record view, as returned to admins and to the submitting donor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeDto {
    /// pledge identifier.
    pub id: u64,

    /// donor display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// donor contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// donor contact phone, or the erasure sentinel.
    pub phone_number: String,

    /// amount in whole currency units.
    pub amount: i64,

    /// donor message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// moderation status.
    pub pledge_status: PledgeStatus,

    /// how the donor pays.
    pub payment_method: PaymentMethod,

    /// submission time.
    pub created_at: DateTime<Utc>,

    /// last change time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Pledge> for PledgeDto {
    fn from(pledge: &Pledge) -> Self {
        Self {
            id: pledge.id.0,
            name: pledge.name.clone(),
            email: pledge.email.clone(),
            phone_number: pledge.phone.clone(),
            amount: pledge.amount,
            message: pledge.message.clone(),
            pledge_status: pledge.status,
            payment_method: pledge.payment_method,
            created_at: pledge.created_at,
            updated_at: pledge.updated_at,
        }
    }
}

/// public submission payload.
///
/// every field is optional at the serde level so a single bad request
/// reports all of its problems in one `details` array instead of
/// failing on the first.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPledgeRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    payment_method: Option<String>,
}

/// admin partial-update payload; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePledgeRequest {
    #[serde(default)]
    pledge_status: Option<String>,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    amount: Option<i64>,
}

/// public feed query string.
#[derive(Debug, Deserialize)]
pub struct PublicFeedQuery {
    #[serde(default)]
    limit: Option<u64>,
}

/// admin list query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPledgesQuery {
    #[serde(default)]
    page: Option<u64>,
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default)]
    status: Option<PledgeStatus>,
    #[serde(default)]
    sort_by: Option<PledgeSortField>,
    #[serde(default)]
    order: Option<SortOrder>,
}

/// POST /api/pledges - public pledge submission.
///
/// always persists as `pending`; the client cannot pre-confirm.
pub async fn submit_pledge(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ApiJson(payload): ApiJson<SubmitPledgeRequest>,
) -> Result<Response, ApiError> {
    let new_pledge = validate_submission(payload).map_err(ApiError::Validation)?;
    let pledge = state.db.create_pledge(&new_pledge).await.map_internal()?;

    state.security_log.record(
        NewSecurityLog::new(SecurityEventKind::PledgeSubmit, ip.to_string())
            .detail(json!({"pledgeId": pledge.id.0, "amount": pledge.amount})),
    );

    Ok((StatusCode::CREATED, success(PledgeDto::from(&pledge))).into_response())
}

/// GET /api/pledges/public - masked confirmed feed plus top-5.
pub async fn public_feed(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PublicFeedQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PUBLIC_LIMIT)
        .clamp(1, MAX_PUBLIC_LIMIT);

    let pledges = state.db.list_confirmed(limit).await.map_internal()?;
    let top = state.db.top_confirmed(TOP_PLEDGE_COUNT).await.map_internal()?;

    Ok(success(json!({
        "pledges": pledges.iter().map(MaskedPledge::from).collect::<Vec<_>>(),
        "topPledges": top.iter().map(MaskedPledge::from).collect::<Vec<_>>(),
    })))
}

/// GET /api/pledges/stats - aggregate counts and sums.
///
/// recomputed from the store on every call; nothing is cached.
pub async fn pledge_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.db.pledge_stats().await.map_internal()?;
    Ok(success(stats))
}

/// GET /api/pledges - paginated unmasked list for the dashboard.
pub async fn list_pledges(
    State(state): State<AppState>,
    _admin: AdminContext,
    ApiQuery(params): ApiQuery<ListPledgesQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut query = PledgeQuery::default();
    if let Some(page) = params.page {
        query.page = page;
    }
    if let Some(limit) = params.limit {
        query.limit = limit;
    }
    query.status = params.status;
    if let Some(sort_by) = params.sort_by {
        query.sort_by = sort_by;
    }
    if let Some(order) = params.order {
        query.order = order;
    }

    // echo the effective values, not the raw request
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

    let (pledges, total) = state.db.list_pledges(&query).await.map_internal()?;
    let top = state.db.top_confirmed(TOP_PLEDGE_COUNT).await.map_internal()?;

    Ok(success(json!({
        "pledges": pledges.iter().map(PledgeDto::from).collect::<Vec<_>>(),
        "total": total,
        "page": page,
        "limit": limit,
        "topPledges": top.iter().map(PledgeDto::from).collect::<Vec<_>>(),
    })))
}

/// GET /api/pledges/{id} - single unmasked record.
pub async fn get_pledge(
    State(state): State<AppState>,
    _admin: AdminContext,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let pledge = state
        .db
        .get_pledge(PledgeId(id))
        .await
        .map_internal()?
        .or_not_found("pledge")?;
    Ok(success(PledgeDto::from(&pledge)))
}

/// PUT /api/pledges/{id} - partial update.
///
/// any subset of status, payment method, name, message and amount;
/// transitions are unconstrained, any status can follow any other.
pub async fn update_pledge(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    admin: AdminContext,
    Path(id): Path<u64>,
    ApiJson(payload): ApiJson<UpdatePledgeRequest>,
) -> Result<Json<Value>, ApiError> {
    let changes = validate_update(payload).map_err(ApiError::Validation)?;
    if changes.is_empty() {
        return Err(ApiError::bad_request("no recognized fields to update"));
    }

    let id = PledgeId(id);
    let before = state
        .db
        .get_pledge(id)
        .await
        .map_internal()?
        .or_not_found("pledge")?;
    let updated = state
        .db
        .update_pledge(id, &changes)
        .await
        .map_internal()?
        .or_not_found("pledge")?;

    state.security_log.record(
        NewSecurityLog::new(SecurityEventKind::PledgeUpdate, ip.to_string())
            .actor(admin.admin.email.clone())
            .detail(json!({"pledgeId": id.0, "fields": changed_fields(&changes)})),
    );

    broadcast_mutation(&state, ip, before.is_confirmed(), &updated).await;

    Ok(success(PledgeDto::from(&updated)))
}

/// DELETE /api/pledges/{id}/erase - redact PII in place.
///
/// idempotent; status and amount survive, contact fields do not.
pub async fn erase_pledge(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    admin: AdminContext,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let id = PledgeId(id);
    let erased = state
        .db
        .erase_pledge(id)
        .await
        .map_internal()?
        .or_not_found("pledge")?;

    state.security_log.record(
        NewSecurityLog::new(SecurityEventKind::PledgeErase, ip.to_string())
            .actor(admin.admin.email.clone())
            .detail(json!({"pledgeId": id.0})),
    );

    // erase never changes status, so confirmed stays confirmed here
    broadcast_mutation(&state, ip, erased.is_confirmed(), &erased).await;

    Ok(success(PledgeDto::from(&erased)))
}

/// push the realtime events an admin mutation produces.
///
/// only mutations resulting in a confirmed record broadcast: the admin
/// room gets the unmasked record, the public room gets fresh totals,
/// and a record newly entering confirmed additionally lands on the
/// public feed. failures are logged and never reach the http caller.
async fn broadcast_mutation(state: &AppState, ip: IpAddr, was_confirmed: bool, after: &Pledge) {
    if let Err(e) = try_broadcast(state, was_confirmed, after).await {
        tracing::warn!(error = %e, pledge_id = after.id.0, "realtime broadcast failed");
        state.security_log.record(
            NewSecurityLog::new(SecurityEventKind::SocketBroadcast, ip.to_string())
                .detail(json!({"pledgeId": after.id.0, "error": e.to_string()})),
        );
    }
}

async fn try_broadcast(
    state: &AppState,
    was_confirmed: bool,
    after: &Pledge,
) -> Result<(), givestream_db::Error> {
    if !after.is_confirmed() {
        return Ok(());
    }

    state
        .broadcaster
        .send_admin(Event::new(EVENT_PLEDGE_UPDATED, PledgeDto::from(after))?);

    if !was_confirmed {
        state
            .broadcaster
            .send_public(Event::new(EVENT_NEW_PLEDGE, MaskedPledge::from(after))?);
    }

    let stats = state.db.pledge_stats().await?;
    state.broadcaster.send_public(Event::new(
        EVENT_STATS_UPDATE,
        json!({
            "totalConfirmedCount": stats.total_confirmed_count,
            "totalConfirmedAmountSum": stats.total_confirmed_amount_sum,
        }),
    )?);

    Ok(())
}

fn changed_fields(changes: &PledgeChanges) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if changes.status.is_some() {
        fields.push("pledgeStatus");
    }
    if changes.payment_method.is_some() {
        fields.push("paymentMethod");
    }
    if changes.name.is_some() {
        fields.push("name");
    }
    if changes.message.is_some() {
        fields.push("message");
    }
    if changes.amount.is_some() {
        fields.push("amount");
    }
    fields
}

/// check a submission payload, collecting every rule violation.
fn validate_submission(req: SubmitPledgeRequest) -> Result<NewPledge, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = match req.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match DisplayName::new(raw) {
            Ok(name) => Some(name),
            Err(e) => {
                errors.push(FieldError::new("name", e.to_string()));
                None
            }
        },
    };

    let email = match req.email.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match Email::new(raw) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push(FieldError::new("email", e.to_string()));
                None
            }
        },
    };

    let phone = match req
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        None => {
            errors.push(FieldError::new("phoneNumber", "phone number is required"));
            None
        }
        Some(raw) => match PhoneNumber::new(raw) {
            Ok(phone) => Some(phone),
            Err(e) => {
                errors.push(FieldError::new("phoneNumber", e.to_string()));
                None
            }
        },
    };

    let amount = match req.amount {
        None => {
            errors.push(FieldError::new("amount", "amount is required"));
            0
        }
        Some(amount) if amount < 1 => {
            errors.push(FieldError::new("amount", "amount must be at least 1"));
            0
        }
        Some(amount) => amount,
    };

    let message = match req.message.filter(|s| !s.is_empty()) {
        None => None,
        Some(message) if message.chars().count() > MAX_MESSAGE_CHARS => {
            errors.push(FieldError::new(
                "message",
                format!("message too long (max {MAX_MESSAGE_CHARS} chars)"),
            ));
            None
        }
        Some(message) => Some(message),
    };

    let payment_method = match req.payment_method.as_deref() {
        None => PaymentMethod::default(),
        Some(raw) => match raw.parse::<PaymentMethod>() {
            Ok(method) => method,
            Err(_) => {
                errors.push(FieldError::new(
                    "paymentMethod",
                    format!("unknown payment method '{raw}'"),
                ));
                PaymentMethod::default()
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    let Some(phone) = phone else {
        // unreachable: a missing phone always records an error above
        return Err(vec![FieldError::new("phoneNumber", "phone number is required")]);
    };

    Ok(NewPledge {
        name,
        email,
        phone,
        amount,
        message,
        payment_method,
    })
}

/// check an update payload, collecting every rule violation.
fn validate_update(req: UpdatePledgeRequest) -> Result<PledgeChanges, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut changes = PledgeChanges::default();

    if let Some(raw) = req.pledge_status.as_deref() {
        match raw.parse::<PledgeStatus>() {
            Ok(status) => changes.status = Some(status),
            Err(_) => errors.push(FieldError::new(
                "pledgeStatus",
                format!("unknown status '{raw}'"),
            )),
        }
    }

    if let Some(raw) = req.payment_method.as_deref() {
        match raw.parse::<PaymentMethod>() {
            Ok(method) => changes.payment_method = Some(method),
            Err(_) => errors.push(FieldError::new(
                "paymentMethod",
                format!("unknown payment method '{raw}'"),
            )),
        }
    }

    if let Some(raw) = req.name.as_deref() {
        match DisplayName::new(raw.trim()) {
            Ok(name) => changes.name = Some(name),
            Err(e) => errors.push(FieldError::new("name", e.to_string())),
        }
    }

    if let Some(message) = req.message {
        if message.chars().count() > MAX_MESSAGE_CHARS {
            errors.push(FieldError::new(
                "message",
                format!("message too long (max {MAX_MESSAGE_CHARS} chars)"),
            ));
        } else {
            changes.message = Some(message);
        }
    }

    if let Some(amount) = req.amount {
        if amount < 1 {
            errors.push(FieldError::new("amount", "amount must be at least 1"));
        } else {
            changes.amount = Some(amount);
        }
    }

    if errors.is_empty() { Ok(changes) } else { Err(errors) }
}
