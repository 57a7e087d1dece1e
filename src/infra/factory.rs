use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::domain::services::{auth_service::AuthService, notification::load_templates};
use crate::infra::repositories::{
    postgres_appointment_repo::PostgresAppointmentRepo, postgres_auth_repo::PostgresAuthRepo,
    postgres_job_repo::PostgresJobRepo, postgres_service_repo::PostgresServiceRepo,
    postgres_skill_repo::PostgresSkillRepo, postgres_tenant_repo::PostgresTenantRepo,
    postgres_user_repo::PostgresUserRepo, postgres_timeslot_repo::PostgresTimeSlotRepo,
    postgres_schedule_repo::PostgresScheduleRepo,
    sqlite_appointment_repo::SqliteAppointmentRepo, sqlite_auth_repo::SqliteAuthRepo,
    sqlite_job_repo::SqliteJobRepo, sqlite_service_repo::SqliteServiceRepo,
    sqlite_skill_repo::SqliteSkillRepo, sqlite_tenant_repo::SqliteTenantRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_timeslot_repo::SqliteTimeSlotRepo,
    sqlite_schedule_repo::SqliteScheduleRepo,
};

/// Connects to the configured database, runs migrations and wires every
/// repository. `postgres://` URLs select Postgres, anything else is SQLite.
pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let email_service = Arc::new(
        HttpEmailService::new(config.mail_service_url.clone(), config.mail_service_token.clone())
            .expect("Failed to initialise mail relay client"),
    );
    let templates = Arc::new(load_templates().expect("Failed to load e-mail templates"));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let auth_repo = Arc::new(PostgresAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(
            AuthService::new(auth_repo.clone(), config.clone()).expect("Failed to initialise auth service"),
        );

        AppState {
            config: config.clone(),
            tenant_repo: Arc::new(PostgresTenantRepo::new(pool.clone())),
            user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
            auth_repo,
            service_repo: Arc::new(PostgresServiceRepo::new(pool.clone())),
            skill_repo: Arc::new(PostgresSkillRepo::new(pool.clone())),
            appointment_repo: Arc::new(PostgresAppointmentRepo::new(pool.clone())),
            job_repo: Arc::new(PostgresJobRepo::new(pool.clone())),
            timeslot_repo: Arc::new(PostgresTimeSlotRepo::new(pool.clone())),
            schedule_repo: Arc::new(PostgresScheduleRepo::new(pool.clone())),
            auth_service,
            email_service,
            templates,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let auth_repo = Arc::new(SqliteAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(
            AuthService::new(auth_repo.clone(), config.clone()).expect("Failed to initialise auth service"),
        );

        AppState {
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
            email_service,
            templates,
        }
    }
}

pub async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
