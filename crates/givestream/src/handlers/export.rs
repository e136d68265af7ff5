//! spreadsheet export of the full pledge store.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::json;

use givestream_db::Store;
use givestream_types::{NewSecurityLog, SecurityEventKind};

use crate::AppState;
use crate::handlers::admin_auth::AdminContext;
use crate::handlers::error::{ApiError, ResultExt};
use crate::rate_limit::ClientIp;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const COLUMNS: [&str; 10] = [
    "ID",
    "Name",
    "Email",
    "Phone",
    "Amount",
    "Message",
    "Status",
    "Payment Method",
    "Created At",
    "Updated At",
];

/// GET /api/pledges/excel - download every record as a workbook.
///
/// single pass, one worksheet, whole file materialized in memory before
/// the response goes out. erased records export with their sentinel
/// values, exactly as stored.
pub async fn export_pledges(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    admin: AdminContext,
) -> Result<Response, ApiError> {
    let pledges = state.db.all_pledges().await.map_internal()?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Pledges").map_internal()?;

    let header = Format::new().set_bold();
    for (col, title) in COLUMNS.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *title, &header)
            .map_internal()?;
    }

    for (i, pledge) in pledges.iter().enumerate() {
        let row = (i + 1) as u32;
        // spreadsheet cells are f64; ids and amounts fit comfortably
        worksheet.write(row, 0, pledge.id.0 as f64).map_internal()?;
        worksheet
            .write(row, 1, pledge.name.as_deref().unwrap_or(""))
            .map_internal()?;
        worksheet
            .write(row, 2, pledge.email.as_deref().unwrap_or(""))
            .map_internal()?;
        worksheet.write(row, 3, pledge.phone.as_str()).map_internal()?;
        worksheet.write(row, 4, pledge.amount as f64).map_internal()?;
        worksheet
            .write(row, 5, pledge.message.as_deref().unwrap_or(""))
            .map_internal()?;
        worksheet.write(row, 6, pledge.status.as_str()).map_internal()?;
        worksheet
            .write(row, 7, pledge.payment_method.as_str())
            .map_internal()?;
        worksheet
            .write(row, 8, pledge.created_at.to_rfc3339())
            .map_internal()?;
        worksheet
            .write(row, 9, pledge.updated_at.to_rfc3339())
            .map_internal()?;
    }

    let bytes = workbook.save_to_buffer().map_internal()?;

    state.security_log.record(
        NewSecurityLog::new(SecurityEventKind::AdminAction, ip.to_string())
            .actor(admin.admin.email.clone())
            .detail(json!({"action": "export", "rows": pledges.len()})),
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"pledges.xlsx\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
