use crate::domain::{models::timeslot::TimeSlot, ports::TimeSlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTimeSlotRepo {
    pool: SqlitePool,
}

impl SqliteTimeSlotRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSlotRepository for SqliteTimeSlotRepo {
    async fn create(&self, slot: &TimeSlot) -> Result<TimeSlot, AppError> {
        sqlx::query_as::<_, TimeSlot>(
            "INSERT INTO time_slots (id, tenant_id, shift, start_time, end_time, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&slot.id)
            .bind(&slot.tenant_id)
            .bind(&slot.shift)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(slot.is_active)
            .bind(slot.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, tenant_id: &str) -> Result<Vec<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots WHERE tenant_id = ? ORDER BY start_time ASC, end_time ASC")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, slot: &TimeSlot) -> Result<TimeSlot, AppError> {
        sqlx::query_as::<_, TimeSlot>(
            "UPDATE time_slots SET shift = ?, start_time = ?, end_time = ?, is_active = ?
             WHERE tenant_id = ? AND id = ?
             RETURNING *"
        )
            .bind(&slot.shift)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(slot.is_active)
            .bind(&slot.tenant_id)
            .bind(&slot.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Time slot not found".into()))
    }
}
