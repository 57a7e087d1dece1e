use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;

/// A recurring bookable window of the salon's day, e.g. "morning 09:00-10:00".
/// Times are wall-clock times in the tenant's zone.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TimeSlot {
    pub id: String,
    pub tenant_id: String,
    pub shift: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(tenant_id: String, shift: String, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            shift,
            start_time,
            end_time,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
