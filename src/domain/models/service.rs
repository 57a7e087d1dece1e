use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A bookable treatment in a tenant's catalog.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Service {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_min: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Service {
    pub fn new(tenant_id: String, name: String, description: Option<String>, price: i64, duration_min: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            name,
            description,
            price,
            duration_min,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
