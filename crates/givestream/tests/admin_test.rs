//! integration tests for the admin pledge endpoints

mod common;

use axum::http::StatusCode;
use serde_json::json;

use givestream_db::Store;
use givestream_types::{DisplayName, Email, NewPledge, PhoneNumber};

use common::{TestApp, body_json};

async fn admin_token(app: &TestApp) -> String {
    let admin = app.create_admin("ops@example.org", "hunter2hunter2").await;
    app.access_token_for(&admin)
}

/// insert a pledge with all optional fields present.
async fn seed_full_pledge(app: &TestApp, amount: i64) -> givestream_types::Pledge {
    app.db
        .create_pledge(&NewPledge {
            name: Some(DisplayName::new("Alice Example").unwrap()),
            email: Some(Email::new("alice@example.com").unwrap()),
            phone: PhoneNumber::new("+4512345678").unwrap(),
            amount,
            message: Some("for the kids".to_string()),
            payment_method: Default::default(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_admin_endpoints_require_authentication() {
    let app = TestApp::spawn().await;

    assert_eq!(
        app.get("/api/pledges").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.get("/api/pledges/1").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.get("/api/pledges/excel").await.status(),
        StatusCode::UNAUTHORIZED
    );

    let update = app
        .send(
            common::request("PUT", "/api/pledges/1")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    json!({"pledgeStatus": "confirmed"}).to_string(),
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(update.status(), StatusCode::UNAUTHORIZED);

    let erase = app
        .send(
            common::request("DELETE", "/api/pledges/1/erase")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(erase.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_and_stale_tokens_rejected_identically() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("ops@example.org", "hunter2hunter2").await;
    let token = app.access_token_for(&admin);
    app.db.delete_admin(admin.id).await.unwrap();

    let garbage = app.get_auth("/api/pledges", "not-a-jwt").await;
    let stale = app.get_auth("/api/pledges", &token).await;

    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    // a token whose account is gone must look like any other bad token
    assert_eq!(body_json(garbage).await, body_json(stale).await);
}

#[tokio::test]
async fn test_list_pledges_pagination() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;

    for i in 0..25 {
        seed_full_pledge(&app, 10 + i).await;
    }

    let response = app.get_auth("/api/pledges?page=2&limit=10", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    assert_eq!(data["pledges"].as_array().unwrap().len(), 10);
    assert_eq!(data["total"], 25);
    assert_eq!(data["page"], 2);
    assert_eq!(data["limit"], 10);
    assert!(data.get("topPledges").is_some());
}

#[tokio::test]
async fn test_list_pledges_status_filter() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;

    let confirmed = seed_full_pledge(&app, 100).await;
    app.db
        .update_pledge(
            confirmed.id,
            &givestream_types::PledgeChanges {
                status: Some(givestream_types::PledgeStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    seed_full_pledge(&app, 50).await;
    seed_full_pledge(&app, 60).await;

    let response = app
        .get_auth("/api/pledges?status=confirmed", &token)
        .await;
    let data = body_json(response).await["data"].clone();

    assert_eq!(data["total"], 1);
    let pledges = data["pledges"].as_array().unwrap();
    assert_eq!(pledges.len(), 1);
    assert_eq!(pledges[0]["pledgeStatus"], "confirmed");
}

#[tokio::test]
async fn test_list_pledges_sorting() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;

    for amount in [300, 100, 200] {
        seed_full_pledge(&app, amount).await;
    }

    let response = app
        .get_auth("/api/pledges?sortBy=amount&order=asc", &token)
        .await;
    let data = body_json(response).await["data"].clone();

    let amounts: Vec<i64> = data["pledges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["amount"].as_i64().unwrap())
        .collect();
    assert_eq!(amounts, vec![100, 200, 300]);
}

#[tokio::test]
async fn test_get_pledge_is_unmasked() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;
    let pledge = seed_full_pledge(&app, 75).await;

    let response = app
        .get_auth(&format!("/api/pledges/{}", pledge.id.0), &token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    // the admin view includes the contact fields the public feed hides
    assert_eq!(data["phoneNumber"], "+4512345678");
    assert_eq!(data["email"], "alice@example.com");
    assert_eq!(data["name"], "Alice Example");
    assert_eq!(data["message"], "for the kids");
}

#[tokio::test]
async fn test_get_missing_pledge_is_404() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;

    let response = app.get_auth("/api/pledges/9999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "pledge not found");
}

#[tokio::test]
async fn test_confirmation_flow_reaches_public_feed() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;

    // donor submits
    let submit = app
        .post_json(
            "/api/pledges",
            &json!({"name": "Alice Example", "phoneNumber": "+1234567890", "amount": 50}),
        )
        .await;
    assert_eq!(submit.status(), StatusCode::CREATED);
    let id = body_json(submit).await["data"]["id"].as_u64().unwrap();

    // not yet public
    let feed = body_json(app.get("/api/pledges/public").await).await;
    assert_eq!(feed["data"]["pledges"].as_array().unwrap().len(), 0);

    // admin confirms
    let update = app
        .put_json_auth(
            &format!("/api/pledges/{id}"),
            &token,
            &json!({"pledgeStatus": "confirmed"}),
        )
        .await;
    assert_eq!(update.status(), StatusCode::OK);
    let updated = body_json(update).await["data"].clone();
    assert_eq!(updated["pledgeStatus"], "confirmed");

    // now public, masked
    let feed = body_json(app.get("/api/pledges/public").await).await;
    let pledges = feed["data"]["pledges"].as_array().unwrap().clone();
    assert_eq!(pledges.len(), 1);
    assert_eq!(pledges[0]["name"], "Alice Example");
    assert_eq!(pledges[0]["amount"], 50);
    assert!(pledges[0].get("phoneNumber").is_none());
}

#[tokio::test]
async fn test_update_rejects_unknown_status() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;
    let pledge = seed_full_pledge(&app, 75).await;

    let response = app
        .put_json_auth(
            &format!("/api/pledges/{}", pledge.id.0),
            &token,
            &json!({"pledgeStatus": "shipped"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let details = body["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "pledgeStatus"));
}

#[tokio::test]
async fn test_update_with_no_fields_rejected() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;
    let pledge = seed_full_pledge(&app, 75).await;

    let response = app
        .put_json_auth(&format!("/api/pledges/{}", pledge.id.0), &token, &json!({}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "no recognized fields to update");
}

#[tokio::test]
async fn test_update_missing_pledge_is_404() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;

    let response = app
        .put_json_auth(
            "/api/pledges/9999",
            &token,
            &json!({"pledgeStatus": "confirmed"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_erase_redacts_and_is_idempotent() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;
    let pledge = seed_full_pledge(&app, 75).await;

    let first = app
        .delete_auth(&format!("/api/pledges/{}/erase", pledge.id.0), &token)
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = body_json(first).await;
    let data = &first_body["data"];

    // identifying fields are gone entirely, not nulled
    assert!(data.get("name").is_none());
    assert!(data.get("email").is_none());
    assert!(data.get("message").is_none());
    assert_eq!(data["phoneNumber"], "erased");

    // the record itself survives
    assert_eq!(data["amount"], 75);
    assert_eq!(data["pledgeStatus"], "pending");
    assert_eq!(data["id"], pledge.id.0);

    // erasing again changes nothing, including timestamps
    let second = app
        .delete_auth(&format!("/api/pledges/{}/erase", pledge.id.0), &token)
        .await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json(second).await, first_body);
}

#[tokio::test]
async fn test_erase_missing_pledge_is_404() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;

    let response = app.delete_auth("/api/pledges/9999/erase", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_returns_workbook() {
    let app = TestApp::spawn().await;
    let token = admin_token(&app).await;
    seed_full_pledge(&app, 75).await;
    seed_full_pledge(&app, 125).await;

    let response = app.get_auth("/api/pledges/excel", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(
        content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("pledges.xlsx"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // xlsx files are zip archives
    assert_eq!(&body[..4], b"PK\x03\x04");
}
