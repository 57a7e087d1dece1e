use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_STAFF: &str = "STAFF";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub tenant_id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub full_name: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(tenant_id: String, username: String, password_hash: String, role: &str, full_name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            username,
            password_hash,
            role: role.to_string(),
            full_name,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Only active staff accounts may be assigned to appointments.
    pub fn is_assignable(&self) -> bool {
        self.role == ROLE_STAFF && self.is_active
    }
}
