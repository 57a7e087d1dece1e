mod common;

use axum::http::StatusCode;
use common::{local_slot, TestApp};
use serde_json::{json, Value};

struct Salon {
    tenant_id: String,
    admin: common::AuthHeaders,
    facial: String,
    hoa: String,
    mai: String,
}

async fn setup(app: &TestApp, slug: &str) -> Salon {
    let tenant = app.create_tenant(slug).await;
    let admin = app.login_admin(&tenant).await;
    let facial = app.create_service(&tenant.id, &admin, "Facial", 60).await;
    let hoa = app.create_staff(&tenant.id, &admin, "hoa", "Hoa Nguyen").await;
    let mai = app.create_staff(&tenant.id, &admin, "mai", "Mai Tran").await;
    Salon { tenant_id: tenant.id, admin, facial, hoa, mai }
}

fn booking(salon: &Salon, start: String, staff: Option<&str>) -> Value {
    json!({
        "customer_name": "Lan Pham",
        "customer_phone": "0901234567",
        "service_id": salon.facial,
        "start_time": start,
        "staff_id": staff,
    })
}

#[tokio::test]
async fn test_booking_computes_end_time_and_price() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let (status, body) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 0), None)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["service_name"], "Facial");
    assert_eq!(body["price"], 300000);
    assert!(body["staff_id"].is_null());

    let start = chrono::DateTime::parse_from_rfc3339(body["start_time"].as_str().unwrap()).unwrap();
    let end = chrono::DateTime::parse_from_rfc3339(body["end_time"].as_str().unwrap()).unwrap();
    assert_eq!((end - start).num_minutes(), 60);
}

#[tokio::test]
async fn test_booking_validation() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(-2, 9, 0), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "past slots are rejected");

    let (status, _) = app.book(&salon.tenant_id, booking(&salon, "tomorrow at nine".into(), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut payload = booking(&salon, local_slot(3, 9, 0), None);
    payload["end_time"] = json!(local_slot(3, 8, 0));
    let (status, _) = app.book(&salon.tenant_id, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "end before start");

    let mut payload = booking(&salon, local_slot(3, 9, 0), None);
    payload["customer_phone"] = json!("   ");
    let (status, _) = app.book(&salon.tenant_id, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut payload = booking(&salon, local_slot(3, 9, 0), None);
    payload["service_id"] = json!("missing");
    let (status, _) = app.book(&salon.tenant_id, payload).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.book("no-such-tenant", booking(&salon, local_slot(3, 9, 0), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inactive_service_cannot_be_booked() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let (status, _) = app.request(
        "PUT",
        &format!("/api/v1/{}/services/{}", salon.tenant_id, salon.facial),
        Some(&salon.admin),
        Some(json!({"is_active": false})),
    ).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 0), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_double_booking_a_staff_member_is_rejected() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 0), Some(&salon.hoa))).await;
    assert_eq!(status, StatusCode::CREATED);

    // 09:30 overlaps Hoa's 09:00-10:00.
    let (status, body) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 30), Some(&salon.hoa))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Hoa Nguyen"), "{}", message);
    assert!(message.contains("09:00"), "{}", message);

    // Back-to-back is fine.
    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 10, 0), Some(&salon.hoa))).await;
    assert_eq!(status, StatusCode::CREATED);

    // Someone else can take the overlapping slot.
    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 30), Some(&salon.mai))).await;
    assert_eq!(status, StatusCode::CREATED);

    // So can nobody.
    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 30), None)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_cancelled_and_deleted_appointments_free_the_slot() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let (_, first) = app.book(&salon.tenant_id, booking(&salon, local_slot(4, 14, 0), Some(&salon.hoa))).await;
    let first_id = first["id"].as_str().unwrap();

    let (status, _) = app.request(
        "POST",
        &format!("/api/v1/{}/appointments/{}/cancel", salon.tenant_id, first_id),
        Some(&salon.admin),
        Some(json!({"reason": "customer is sick"})),
    ).await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = app.book(&salon.tenant_id, booking(&salon, local_slot(4, 14, 0), Some(&salon.hoa))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.request(
        "DELETE",
        &format!("/api/v1/{}/appointments/{}", salon.tenant_id, second["id"].as_str().unwrap()),
        Some(&salon.admin),
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(4, 14, 30), Some(&salon.hoa))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_reassigning_and_rescheduling_run_the_conflict_check() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    app.book(&salon.tenant_id, booking(&salon, local_slot(3, 11, 0), Some(&salon.hoa))).await;
    let (_, other) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 11, 30), None)).await;
    let uri = format!("/api/v1/{}/appointments/{}", salon.tenant_id, other["id"].as_str().unwrap());

    let (status, _) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"staff_id": salon.hoa}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"staff_id": salon.mai}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["staff_name"], "Mai Tran");

    // Keeping the same staff member and time is not a conflict with itself.
    let (status, _) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"staff_id": salon.mai}))).await;
    assert_eq!(status, StatusCode::OK);

    // Mai already has 13:00, so moving this booking there collides.
    app.book(&salon.tenant_id, booking(&salon, local_slot(3, 13, 0), Some(&salon.mai))).await;
    let (status, _) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"start_time": local_slot(3, 13, 15)}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"staff_id": ""}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["staff_id"].is_null());
}

#[tokio::test]
async fn test_overnight_booking_blocks_the_next_morning() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    // 23:30 plus a 60 minute facial runs until 00:30 the next day.
    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 23, 30), Some(&salon.hoa))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, early) = app.book(&salon.tenant_id, booking(&salon, local_slot(4, 0, 0), None)).await;
    let uri = format!("/api/v1/{}/appointments/{}", salon.tenant_id, early["id"].as_str().unwrap());

    let (status, body) = app.request("GET", &format!("{}/staff-options", uri), Some(&salon.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let options = body.as_array().unwrap();
    assert_eq!(options[0]["full_name"], "Mai Tran");
    assert_eq!(options[1]["full_name"], "Hoa Nguyen");
    assert_eq!(options[1]["busy"], true, "{}", body);

    let (status, _) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"staff_id": salon.hoa}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(4, 0, 15), Some(&salon.hoa))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(4, 0, 30), Some(&salon.hoa))).await;
    assert_eq!(status, StatusCode::CREATED, "starting as the late booking ends is fine");
}

#[tokio::test]
async fn test_rescheduling_into_the_past_is_rejected() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let (_, appt) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 0), None)).await;
    let uri = format!("/api/v1/{}/appointments/{}", salon.tenant_id, appt["id"].as_str().unwrap());

    let (status, _) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"start_time": local_slot(-1, 9, 0)}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) = app.request("GET", &uri, Some(&salon.admin), None).await;
    assert_eq!(stored["start_time"], appt["start_time"]);

    // Re-sending the current start alongside other edits is not a reschedule.
    let (status, body) = app.request(
        "PUT",
        &uri,
        Some(&salon.admin),
        Some(json!({"start_time": appt["start_time"], "notes": "prefers lavender oil"})),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "prefers lavender oil");
}

#[tokio::test]
async fn test_unknown_staff_member_is_not_found() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let (status, _) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 0), Some("ghost"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_lifecycle_over_http() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let (_, appt) = app.book(&salon.tenant_id, booking(&salon, local_slot(2, 15, 0), None)).await;
    let uri = format!("/api/v1/{}/appointments/{}/status", salon.tenant_id, appt["id"].as_str().unwrap());

    let (status, _) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::CONFLICT, "pending cannot jump to completed");

    let (status, _) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"status": "no-show"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"status": "confirmed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let (status, body) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"status": "confirmed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let (status, body) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let (status, _) = app.request("PUT", &uri, Some(&salon.admin), Some(json!({"status": "cancelled"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let edit = format!("/api/v1/{}/appointments/{}", salon.tenant_id, appt["id"].as_str().unwrap());
    let (status, _) = app.request("PUT", &edit, Some(&salon.admin), Some(json!({"start_time": local_slot(5, 9, 0)}))).await;
    assert_eq!(status, StatusCode::CONFLICT, "completed appointments cannot be rescheduled");

    let (status, body) = app.request("PUT", &edit, Some(&salon.admin), Some(json!({"notes": "paid in cash"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "paid in cash");
}

#[tokio::test]
async fn test_cancel_records_reason() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let mut payload = booking(&salon, local_slot(2, 10, 0), None);
    payload["notes"] = json!("first visit");
    let (_, appt) = app.book(&salon.tenant_id, payload).await;
    let uri = format!("/api/v1/{}/appointments/{}/cancel", salon.tenant_id, appt["id"].as_str().unwrap());

    let (status, body) = app.request("POST", &uri, Some(&salon.admin), Some(json!({"reason": "rain"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["notes"], "first visit | CANCELLED: rain");

    let (status, _) = app.request("POST", &uri, Some(&salon.admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT, "already cancelled");
}

#[tokio::test]
async fn test_staff_options_flags() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 0), Some(&salon.hoa))).await;
    let (_, appt) = app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 30), None)).await;

    let (status, body) = app.request(
        "GET",
        &format!("/api/v1/{}/appointments/{}/staff-options", salon.tenant_id, appt["id"].as_str().unwrap()),
        Some(&salon.admin),
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);

    let options = body.as_array().unwrap();
    assert_eq!(options.len(), 2, "admin account is not offered");
    assert_eq!(options[0]["full_name"], "Mai Tran");
    assert_eq!(options[0]["busy"], false);
    assert_eq!(options[1]["full_name"], "Hoa Nguyen");
    assert_eq!(options[1]["busy"], true);
    assert_eq!(options[1]["eligible"], true);
}

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    for hour in 9..14 {
        app.book(&salon.tenant_id, booking(&salon, local_slot(3, hour, 0), None)).await;
    }
    let mut payload = booking(&salon, local_slot(6, 9, 0), None);
    payload["customer_name"] = json!("Quang Vo");
    payload["customer_phone"] = json!("0987000111");
    app.book(&salon.tenant_id, payload).await;

    let base = format!("/api/v1/{}/appointments", salon.tenant_id);

    let (status, page) = app.request("GET", &format!("{}?per_page=4", base), Some(&salon.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 6);
    assert_eq!(page["items"].as_array().unwrap().len(), 4);

    let (_, page) = app.request("GET", &format!("{}?per_page=4&page=1", base), Some(&salon.admin), None).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let (_, page) = app.request("GET", &format!("{}?q=quang", base), Some(&salon.admin), None).await;
    assert_eq!(page["total"], 1);

    let day = local_slot(6, 0, 0)[..10].to_string();
    let (_, page) = app.request("GET", &format!("{}?from={}&to={}", base, day, day), Some(&salon.admin), None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["customer_name"], "Quang Vo");

    let (_, page) = app.request("GET", &format!("{}?status=confirmed", base), Some(&salon.admin), None).await;
    assert_eq!(page["total"], 0);

    let (status, _) = app.request("GET", &format!("{}?status=lost", base), Some(&salon.admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.request("GET", &format!("{}?from=06/01/2024", base), Some(&salon.admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_history_and_stats() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    let (_, first) = app.book(&salon.tenant_id, booking(&salon, local_slot(1, 9, 0), None)).await;
    app.book(&salon.tenant_id, booking(&salon, local_slot(5, 9, 0), None)).await;

    let status_uri = format!("/api/v1/{}/appointments/{}/status", salon.tenant_id, first["id"].as_str().unwrap());
    app.request("PUT", &status_uri, Some(&salon.admin), Some(json!({"status": "confirmed"}))).await;
    app.request("PUT", &status_uri, Some(&salon.admin), Some(json!({"status": "completed"}))).await;

    let (status, history) = app.request(
        "GET",
        &format!("/api/v1/{}/customers/history?phone=0901234567", salon.tenant_id),
        Some(&salon.admin),
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["id"], first["id"], "newest first");

    let (_, stats) = app.request(
        "GET",
        &format!("/api/v1/{}/customers/stats?phone=0901234567", salon.tenant_id),
        Some(&salon.admin),
        None,
    ).await;
    assert_eq!(stats["total_appointments"], 2);
    assert_eq!(stats["completed_appointments"], 1);
    assert_eq!(stats["total_spent"], 300000);

    let (status, _) = app.request(
        "GET",
        &format!("/api/v1/{}/customers/stats?phone=", salon.tenant_id),
        Some(&salon.admin),
        None,
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_staff_sees_only_their_own_schedule() {
    let app = TestApp::new().await;
    let salon = setup(&app, "lotus").await;

    app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 0), Some(&salon.hoa))).await;
    app.book(&salon.tenant_id, booking(&salon, local_slot(3, 9, 0), Some(&salon.mai))).await;
    app.book(&salon.tenant_id, booking(&salon, local_slot(3, 11, 0), Some(&salon.hoa))).await;

    let hoa = app.login(&salon.tenant_id, "hoa", "staff-password").await;
    let (status, body) = app.request(
        "GET",
        &format!("/api/v1/{}/staff/me/appointments", salon.tenant_id),
        Some(&hoa),
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);
    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|a| a["staff_id"] == salon.hoa.as_str()));

    let (status, _) = app.request("GET", &format!("/api/v1/{}/appointments", salon.tenant_id), Some(&hoa), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
