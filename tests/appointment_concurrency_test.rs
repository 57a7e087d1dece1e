mod common;

use common::TestApp;
use spa_backend::{
    domain::models::{
        appointment::{Appointment, NewAppointmentParams},
        service::Service,
        tenant::Tenant,
        user::{User, ROLE_STAFF},
    },
    domain::ports::{AppointmentRepository, ServiceRepository, TenantRepository, UserRepository},
    error::AppError,
    infra::repositories::{
        postgres_appointment_repo::PostgresAppointmentRepo, postgres_service_repo::PostgresServiceRepo,
        postgres_tenant_repo::PostgresTenantRepo, postgres_user_repo::PostgresUserRepo,
    },
};
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::task::JoinSet;

const WRITERS: usize = 8;
const ROUNDS: i64 = 5;

fn contender(tenant_id: &str, service: &Service, staff_id: &str, start: DateTime<Utc>, n: usize) -> Appointment {
    let mut appointment = Appointment::new(
        NewAppointmentParams {
            tenant_id: tenant_id.to_string(),
            customer_name: format!("Customer {}", n),
            customer_phone: format!("09000000{:02}", n),
            customer_email: None,
            start,
            notes: None,
        },
        service,
    );
    appointment.staff_id = Some(staff_id.to_string());
    appointment.staff_name = Some("Hoa".to_string());
    appointment
}

/// Fires `WRITERS` overlapping bookings for one staff member at once and
/// returns (created, conflicts, other errors).
async fn race(
    repo: Arc<dyn AppointmentRepository>,
    tenant_id: &str,
    service: &Service,
    staff_id: &str,
    start: DateTime<Utc>,
) -> (usize, usize, Vec<String>) {
    let mut set = JoinSet::new();
    for n in 0..WRITERS {
        let repo = repo.clone();
        // Staggered by five minutes so every pair still overlaps.
        let appointment = contender(tenant_id, service, staff_id, start + Duration::minutes(5 * n as i64), n);
        set.spawn(async move { repo.create_with_jobs(&appointment, Vec::new()).await });
    }

    let (mut created, mut conflicts, mut other) = (0, 0, Vec::new());
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(e) => other.push(e.to_string()),
        }
    }
    (created, conflicts, other)
}

#[tokio::test]
async fn test_sqlite_parallel_bookings_admit_one() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("race-sqlite").await;
    let admin = app.login_admin(&tenant).await;
    let service_id = app.create_service(&tenant.id, &admin, "Hot stone massage", 90).await;
    let hoa = app.create_staff(&tenant.id, &admin, "hoa", "Hoa").await;
    let service = app.state.service_repo.find_by_id(&tenant.id, &service_id).await.unwrap().unwrap();

    for round in 0..ROUNDS {
        let start = Utc::now() + Duration::days(2 + round);
        let (created, conflicts, other) = race(app.state.appointment_repo.clone(), &tenant.id, &service, &hoa, start).await;
        assert!(other.is_empty(), "writers failed outside the overlap guard: {:?}", other);
        assert_eq!(created, 1, "round {} admitted {} bookings", round, created);
        assert_eq!(conflicts, WRITERS - 1);
    }

    let booked = app.state.appointment_repo.list_by_staff(&tenant.id, &hoa).await.unwrap();
    assert_eq!(booked.len(), ROUNDS as usize);
}

#[tokio::test]
async fn test_postgres_parallel_bookings_admit_one() {
    let db_url = match std::env::var("DATABASE_URL") {
        Ok(url) if url.starts_with("postgres") => url,
        _ => {
            println!("Skipping booking race test (DATABASE_URL is not Postgres)");
            return;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(WRITERS as u32 * 2)
        .connect(&db_url)
        .await
        .expect("Failed to connect to DB");
    sqlx::migrate!("./migrations/postgres").run(&pool).await.expect("Failed to migrate");

    let tenants = PostgresTenantRepo::new(pool.clone());
    let tenant = Tenant::new("Race spa".into(), format!("race-{}", uuid::Uuid::new_v4()), "Asia/Ho_Chi_Minh".into());
    tenants.create(&tenant).await.unwrap();

    let staff = User::new(tenant.id.clone(), "hoa".into(), "not-a-hash".into(), ROLE_STAFF, "Hoa".into());
    PostgresUserRepo::new(pool.clone()).create(&staff).await.unwrap();
    let service = Service::new(tenant.id.clone(), "Hot stone massage".into(), None, 300000, 90);
    PostgresServiceRepo::new(pool.clone()).create(&service).await.unwrap();

    let repo: Arc<dyn AppointmentRepository> = Arc::new(PostgresAppointmentRepo::new(pool.clone()));
    for round in 0..ROUNDS {
        let start = Utc::now() + Duration::days(2 + round);
        let (created, conflicts, other) = race(repo.clone(), &tenant.id, &service, &staff.id, start).await;
        assert!(other.is_empty(), "writers failed outside the overlap guard: {:?}", other);
        assert_eq!(created, 1, "round {} admitted {} bookings", round, created);
        assert_eq!(conflicts, WRITERS - 1);
    }

    sqlx::query("DELETE FROM tenants WHERE id = $1")
        .bind(&tenant.id)
        .execute(&pool)
        .await
        .unwrap();
}
