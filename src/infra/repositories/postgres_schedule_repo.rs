use crate::domain::{models::schedule::StaffSchedule, ports::{ScheduleFilter, ScheduleRepository}};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder, Postgres};

pub struct PostgresScheduleRepo {
    pool: PgPool,
}

impl PostgresScheduleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepo {
    async fn create(&self, schedule: &StaffSchedule) -> Result<StaffSchedule, AppError> {
        sqlx::query_as::<_, StaffSchedule>(
            "INSERT INTO staff_schedules (id, tenant_id, user_id, work_date, shift, start_time, end_time, status, note, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *"
        )
            .bind(&schedule.id)
            .bind(&schedule.tenant_id)
            .bind(&schedule.user_id)
            .bind(schedule.work_date)
            .bind(&schedule.shift)
            .bind(schedule.start_time)
            .bind(schedule.end_time)
            .bind(&schedule.status)
            .bind(&schedule.note)
            .bind(schedule.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<StaffSchedule>, AppError> {
        sqlx::query_as::<_, StaffSchedule>("SELECT * FROM staff_schedules WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, tenant_id: &str, filter: &ScheduleFilter) -> Result<Vec<StaffSchedule>, AppError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM staff_schedules WHERE tenant_id = ");
        query.push_bind(tenant_id.to_string());
        if let Some(user_id) = &filter.user_id {
            query.push(" AND user_id = ").push_bind(user_id.clone());
        }
        if let Some(from) = filter.from {
            query.push(" AND work_date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND work_date <= ").push_bind(to);
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ").push_bind(status.clone());
        }
        query.push(" ORDER BY work_date ASC, start_time ASC");

        query.build_query_as::<StaffSchedule>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, schedule: &StaffSchedule) -> Result<StaffSchedule, AppError> {
        sqlx::query_as::<_, StaffSchedule>(
            "UPDATE staff_schedules SET work_date = $1, shift = $2, start_time = $3, end_time = $4, status = $5, note = $6
             WHERE tenant_id = $7 AND id = $8
             RETURNING *"
        )
            .bind(schedule.work_date)
            .bind(&schedule.shift)
            .bind(schedule.start_time)
            .bind(schedule.end_time)
            .bind(&schedule.status)
            .bind(&schedule.note)
            .bind(&schedule.tenant_id)
            .bind(&schedule.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Schedule not found".into()))
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM staff_schedules WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Schedule not found".into()));
        }
        Ok(())
    }
}
