use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub timezone: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(name: String, slug: String, timezone: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            timezone,
            logo_url: None,
            created_at: Utc::now(),
        }
    }

    /// Calendar days for appointments are evaluated in this zone.
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}
