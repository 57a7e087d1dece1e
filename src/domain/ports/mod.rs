use crate::domain::models::{
    appointment::Appointment, auth::RefreshTokenRecord, job::Job, schedule::StaffSchedule,
    service::Service, skill::{Skill, StaffSkill}, tenant::Tenant, timeslot::TimeSlot, user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError>;
    async fn update(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_username(&self, tenant_id: &str, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<User>, AppError>;
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
    async fn delete_expired_for_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Service>, AppError>;
    async fn list(&self, tenant_id: &str) -> Result<Vec<Service>, AppError>;
    async fn update(&self, service: &Service) -> Result<Service, AppError>;
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError>;
}

/// Skills plus the two join tables that drive staff eligibility.
#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn create(&self, skill: &Skill) -> Result<Skill, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Skill>, AppError>;
    async fn list(&self, tenant_id: &str) -> Result<Vec<Skill>, AppError>;
    async fn update(&self, skill: &Skill) -> Result<Skill, AppError>;
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError>;

    async fn set_staff_skills(&self, user_id: &str, skill_ids: &[String]) -> Result<(), AppError>;
    async fn list_staff_skills(&self, tenant_id: &str) -> Result<Vec<StaffSkill>, AppError>;
    async fn list_skills_for_staff(&self, user_id: &str) -> Result<Vec<StaffSkill>, AppError>;

    async fn set_skill_services(&self, skill_id: &str, service_ids: &[String]) -> Result<(), AppError>;
    async fn list_service_ids_for_skill(&self, skill_id: &str) -> Result<Vec<String>, AppError>;
    async fn list_skill_ids_for_service(&self, service_id: &str) -> Result<Vec<String>, AppError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Inserts the appointment and its notification jobs atomically. When a staff
    /// member is assigned, fails with `Conflict` if they already hold an
    /// overlapping non-cancelled appointment.
    async fn create_with_jobs(&self, appointment: &Appointment, jobs: Vec<Job>) -> Result<Appointment, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>, AppError>;
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_range(&self, tenant_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_staff(&self, tenant_id: &str, staff_id: &str) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_phone(&self, tenant_id: &str, phone: &str) -> Result<Vec<Appointment>, AppError>;
    /// Same overlap guard as `create_with_jobs`, excluding the row itself.
    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppError>;
    /// Persists the cancelled row, drops its pending jobs and queues `jobs`.
    async fn cancel(&self, appointment: &Appointment, jobs: Vec<Job>) -> Result<Appointment, AppError>;
    async fn soft_delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, AppError>;
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError>;
    async fn list_jobs(&self, tenant_id: &str) -> Result<Vec<Job>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
    /// Cancels the appointment's still-pending jobs of `job_type`.
    async fn cancel_pending_jobs(&self, appointment_id: &str, job_type: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait TimeSlotRepository: Send + Sync {
    async fn create(&self, slot: &TimeSlot) -> Result<TimeSlot, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<TimeSlot>, AppError>;
    /// Ordered by start time.
    async fn list(&self, tenant_id: &str) -> Result<Vec<TimeSlot>, AppError>;
    async fn update(&self, slot: &TimeSlot) -> Result<TimeSlot, AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct ScheduleFilter {
    pub user_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<String>,
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, schedule: &StaffSchedule) -> Result<StaffSchedule, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<StaffSchedule>, AppError>;
    /// Ordered by work date, then start time.
    async fn list(&self, tenant_id: &str, filter: &ScheduleFilter) -> Result<Vec<StaffSchedule>, AppError>;
    async fn update(&self, schedule: &StaffSchedule) -> Result<StaffSchedule, AppError>;
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str, attachment_name: Option<&str>, attachment_data: Option<&[u8]>) -> Result<(), AppError>;
}
