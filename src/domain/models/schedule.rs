use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::FromRow;

pub const SCHEDULE_PENDING: &str = "pending";
pub const SCHEDULE_CANCELLED: &str = "cancelled";
pub const SCHEDULE_STATUSES: [&str; 4] = [SCHEDULE_PENDING, "confirmed", "completed", SCHEDULE_CANCELLED];

/// One shift a staff member works on `work_date`, in the tenant's wall-clock time.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct StaffSchedule {
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub work_date: NaiveDate,
    pub shift: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StaffSchedule {
    pub fn new(
        tenant_id: String,
        user_id: String,
        work_date: NaiveDate,
        shift: String,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            user_id,
            work_date,
            shift,
            start_time,
            end_time,
            status: SCHEDULE_PENDING.to_string(),
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == SCHEDULE_CANCELLED
    }

    /// True when `[start, end)` (local) lies inside this shift.
    pub fn covers(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.work_date.and_time(self.start_time) <= start && end <= self.work_date.and_time(self.end_time)
    }
}
