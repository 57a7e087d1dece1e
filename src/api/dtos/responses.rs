use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::user::User;
use crate::domain::services::eligibility::SkillTag;

#[derive(Serialize)]
pub struct TenantCreatedResponse {
    pub tenant_id: String,
    pub admin_username: String,
    pub admin_secret: String,
}

#[derive(Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub skills: Vec<SkillTag>,
    pub created_at: DateTime<Utc>,
}

impl MemberResponse {
    pub fn new(user: User, skills: Vec<SkillTag>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            image_url: user.image_url,
            is_active: user.is_active,
            skills,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct SkillServicesResponse {
    pub skill_id: String,
    pub service_ids: Vec<String>,
}
