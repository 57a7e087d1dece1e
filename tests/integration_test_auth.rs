mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{cookie_value, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_tenant_onboarding() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("lotus").await;

    let (status, body) = app.request("GET", "/api/v1/tenants/by-slug/lotus", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], tenant.id.as_str());
    assert_eq!(body["timezone"], "Asia/Ho_Chi_Minh");

    let (status, _) = app.request("POST", "/api/v1/tenants", None, Some(json!({"name": "Copy", "slug": "lotus"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.request(
        "POST",
        "/api/v1/tenants",
        None,
        Some(json!({"name": "Nowhere", "slug": "nowhere", "timezone": "Mars/Olympus"})),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let admin = app.login_admin(&tenant).await;
    let (status, body) = app.request("PUT", "/api/v1/tenants", Some(&admin), Some(json!({"timezone": "Asia/Bangkok"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timezone"], "Asia/Bangkok");

    let (status, body) = app.request("GET", "/api/v1/tenants", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "lotus");
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("lotus").await;

    let (status, _) = app.request(
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"tenant_id": tenant.id, "username": "admin", "password": "wrong"})),
    ).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.request(
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"tenant_id": tenant.id, "username": "nobody", "password": "wrong"})),
    ).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin = app.login_admin(&tenant).await;
    let hoa = app.create_staff(&tenant.id, &admin, "hoa", "Hoa Nguyen").await;
    app.request("PUT", &format!("/api/v1/{}/members/{}", tenant.id, hoa), Some(&admin), Some(json!({"is_active": false}))).await;

    let (status, _) = app.request(
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"tenant_id": tenant.id, "username": "hoa", "password": "staff-password"})),
    ).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_routes_require_auth_and_role() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("lotus").await;
    let admin = app.login_admin(&tenant).await;
    app.create_staff(&tenant.id, &admin, "hoa", "Hoa Nguyen").await;
    let staff = app.login(&tenant.id, "hoa", "staff-password").await;

    let uri = format!("/api/v1/{}/appointments", tenant.id);
    let (status, _) = app.request("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.request("GET", &uri, Some(&staff), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request("GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_tokens_do_not_cross_tenants() {
    let app = TestApp::new().await;
    let lotus = app.create_tenant("lotus").await;
    let orchid = app.create_tenant("orchid").await;
    let lotus_admin = app.login_admin(&lotus).await;

    let (status, _) = app.request("GET", &format!("/api/v1/{}/members", orchid.id), Some(&lotus_admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(
        "POST",
        &format!("/api/v1/{}/services", orchid.id),
        Some(&lotus_admin),
        Some(json!({"name": "Facial", "price": 1, "duration_min": 30})),
    ).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_mutations_require_csrf_token() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("lotus").await;
    let admin = app.login_admin(&tenant).await;

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/{}/skills", tenant.id))
            .header(header::COOKIE, format!("access_token={}", admin.access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"skill_name": "Massage"}).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let forged = common::AuthHeaders { access_token: admin.access_token.clone(), csrf_token: "forged".into() };
    let (status, _) = app.request("POST", &format!("/api/v1/{}/skills", tenant.id), Some(&forged), Some(json!({"skill_name": "Massage"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request("POST", &format!("/api/v1/{}/skills", tenant.id), Some(&admin), Some(json!({"skill_name": "Massage"}))).await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn post_with_refresh(app: &TestApp, uri: &str, refresh_token: &str) -> (StatusCode, Vec<String>, Value) {
    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, format!("refresh_token={}", refresh_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();

    let status = response.status();
    let cookies: Vec<String> = response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cookies, body)
}

#[tokio::test]
async fn test_refresh_rotates_and_logout_revokes() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("lotus").await;

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"tenant_id": tenant.id, "username": "admin", "password": tenant.admin_secret}).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookies: Vec<String> = response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect();
    let first_refresh = cookie_value(&cookies, "refresh_token").unwrap();

    let (status, cookies, body) = post_with_refresh(&app, "/api/v1/auth/refresh", &first_refresh).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "ADMIN");
    let second_refresh = cookie_value(&cookies, "refresh_token").unwrap();
    assert_ne!(first_refresh, second_refresh);

    let (status, _, _) = post_with_refresh(&app, "/api/v1/auth/refresh", &first_refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "rotated token is single use");

    let (status, _, _) = post_with_refresh(&app, "/api/v1/auth/logout", &second_refresh).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = post_with_refresh(&app, "/api/v1/auth/refresh", &second_refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
