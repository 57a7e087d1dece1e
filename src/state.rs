use std::sync::Arc;
use crate::domain::ports::{
    AppointmentRepository, AuthRepository, EmailService, JobRepository, ScheduleRepository,
    ServiceRepository, SkillRepository, TenantRepository, TimeSlotRepository, UserRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::config::Config;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tenant_repo: Arc<dyn TenantRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub skill_repo: Arc<dyn SkillRepository>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub timeslot_repo: Arc<dyn TimeSlotRepository>,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub auth_service: Arc<AuthService>,
    pub email_service: Arc<dyn EmailService>,
    pub templates: Arc<Tera>,
}
