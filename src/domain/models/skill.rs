use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Skill {
    pub id: String,
    pub tenant_id: String,
    pub skill_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Skill {
    pub fn new(tenant_id: String, skill_name: String, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            skill_name,
            description,
            created_at: Utc::now(),
        }
    }
}

/// One row of the staff ↔ skill join, with the skill name resolved.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq, Eq)]
pub struct StaffSkill {
    pub user_id: String,
    pub skill_id: String,
    pub skill_name: String,
}
