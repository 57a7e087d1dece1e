#![allow(dead_code)]

use spa_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::repositories::{
        sqlite_appointment_repo::SqliteAppointmentRepo,
        sqlite_auth_repo::SqliteAuthRepo,
        sqlite_job_repo::SqliteJobRepo,
        sqlite_service_repo::SqliteServiceRepo,
        sqlite_skill_repo::SqliteSkillRepo,
        sqlite_tenant_repo::SqliteTenantRepo,
        sqlite_user_repo::SqliteUserRepo,
        sqlite_timeslot_repo::SqliteTimeSlotRepo,
        sqlite_schedule_repo::SqliteScheduleRepo,
    },
    domain::services::{auth_service::AuthService, notification::load_templates},
    domain::ports::EmailService,
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use std::str::FromStr;
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachment_name: Option<String>,
}

/// Records every message instead of relaying it.
#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        _attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            attachment_name: attachment_name.map(String::from),
        });
        Ok(())
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

pub struct TestTenant {
    pub id: String,
    pub admin_secret: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub mailer: Arc<MockEmailService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            default_timezone: "Asia/Ho_Chi_Minh".to_string(),
            reminder_lead_hours: 24,
        };

        let auth_repo = Arc::new(SqliteAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()).unwrap());
        let mailer = Arc::new(MockEmailService::default());

        let state = Arc::new(AppState {
            config: config.clone(),
            tenant_repo: Arc::new(SqliteTenantRepo::new(pool.clone())),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            auth_repo,
            service_repo: Arc::new(SqliteServiceRepo::new(pool.clone())),
            skill_repo: Arc::new(SqliteSkillRepo::new(pool.clone())),
            appointment_repo: Arc::new(SqliteAppointmentRepo::new(pool.clone())),
            job_repo: Arc::new(SqliteJobRepo::new(pool.clone())),
            timeslot_repo: Arc::new(SqliteTimeSlotRepo::new(pool.clone())),
            schedule_repo: Arc::new(SqliteScheduleRepo::new(pool.clone())),
            auth_service,
            email_service: mailer.clone(),
            templates: Arc::new(load_templates().unwrap()),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            mailer,
        }
    }

    /// Sends a JSON request, authenticated when `auth` is given, and returns
    /// the status with the parsed body (`Value::Null` when empty).
    pub async fn request(&self, method: &str, uri: &str, auth: Option<&AuthHeaders>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }

    pub async fn create_tenant(&self, slug: &str) -> TestTenant {
        let (status, body) = self.request(
            "POST",
            "/api/v1/tenants",
            None,
            Some(json!({"name": format!("{} spa", slug), "slug": slug, "timezone": "Asia/Ho_Chi_Minh"})),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "tenant creation failed: {}", body);

        TestTenant {
            id: body["tenant_id"].as_str().unwrap().to_string(),
            admin_secret: body["admin_secret"].as_str().unwrap().to_string(),
        }
    }

    pub async fn login(&self, tenant_id: &str, username: &str, password: &str) -> AuthHeaders {
        let payload = serde_json::json!({
            "tenant_id": tenant_id,
            "username": username,
            "password": password
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token = cookie_value(&cookies, "access_token").expect("No access_token cookie returned");

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        AuthHeaders {
            access_token,
            csrf_token
        }
    }

    pub async fn login_admin(&self, tenant: &TestTenant) -> AuthHeaders {
        self.login(&tenant.id, "admin", &tenant.admin_secret).await
    }

    pub async fn create_service(&self, tenant_id: &str, admin: &AuthHeaders, name: &str, duration_min: i32) -> String {
        let (status, body) = self.request(
            "POST",
            &format!("/api/v1/{}/services", tenant_id),
            Some(admin),
            Some(json!({"name": name, "price": 300000, "duration_min": duration_min})),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "service creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_staff(&self, tenant_id: &str, admin: &AuthHeaders, username: &str, full_name: &str) -> String {
        let (status, body) = self.request(
            "POST",
            &format!("/api/v1/{}/members", tenant_id),
            Some(admin),
            Some(json!({"username": username, "password": "staff-password", "full_name": full_name})),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "staff creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn book(&self, tenant_id: &str, payload: Value) -> (StatusCode, Value) {
        self.request("POST", &format!("/api/v1/{}/appointments", tenant_id), None, Some(payload)).await
    }

    pub fn sent_mail(&self) -> Vec<SentMail> {
        self.mailer.sent.lock().unwrap().clone()
    }
}

pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    cookies.iter()
        .find(|c| c.starts_with(&prefix))
        .map(|c| c[prefix.len()..].split(';').next().unwrap_or_default().to_string())
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// RFC 3339 timestamp for `hour:minute` in Ho Chi Minh City, `days_ahead` days from today.
pub fn local_slot(days_ahead: i64, hour: u32, minute: u32) -> String {
    let tz: chrono_tz::Tz = "Asia/Ho_Chi_Minh".parse().unwrap();
    let day = (chrono::Utc::now() + chrono::Duration::days(days_ahead)).with_timezone(&tz).date_naive();
    format!("{}T{:02}:{:02}:00+07:00", day, hour, minute)
}

/// `YYYY-MM-DD` of the Ho Chi Minh City day `days_ahead` days from today.
pub fn local_day(days_ahead: i64) -> String {
    local_slot(days_ahead, 0, 0)[..10].to_string()
}
