pub mod sqlite_tenant_repo;
pub mod sqlite_user_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_service_repo;
pub mod sqlite_skill_repo;
pub mod sqlite_appointment_repo;
pub mod sqlite_job_repo;
pub mod sqlite_timeslot_repo;
pub mod sqlite_schedule_repo;

pub mod postgres_tenant_repo;
pub mod postgres_user_repo;
pub mod postgres_auth_repo;
pub mod postgres_service_repo;
pub mod postgres_skill_repo;
pub mod postgres_appointment_repo;
pub mod postgres_job_repo;
pub mod postgres_timeslot_repo;
pub mod postgres_schedule_repo;
