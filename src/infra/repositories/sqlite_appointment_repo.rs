use crate::domain::{models::{appointment::Appointment, job::Job}, ports::AppointmentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqliteConnection, SqlitePool};
use chrono::{DateTime, Utc};

const OVERLAP_QUERY: &str = "SELECT COUNT(*) as count FROM appointments
     WHERE staff_id = ? AND id != ? AND is_active = 1 AND status != 'cancelled'
     AND start_time < ? AND end_time > ?";

// Write lock is taken before the overlap read.
const WRITE_TX: &str = "BEGIN IMMEDIATE";

pub struct SqliteAppointmentRepo {
    pool: SqlitePool,
}

impl SqliteAppointmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn count_overlap(conn: &mut SqliteConnection, staff_id: &str, exclude_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError> {
    let row = sqlx::query(OVERLAP_QUERY)
        .bind(staff_id)
        .bind(exclude_id)
        .bind(end)
        .bind(start)
        .fetch_one(conn)
        .await
        .map_err(AppError::Database)?;
    Ok(row.get::<i64, _>("count"))
}

/// Re-checks the staff member's calendar inside the write transaction.
async fn guard_staff_overlap(conn: &mut SqliteConnection, appointment: &Appointment) -> Result<(), AppError> {
    let Some(staff_id) = &appointment.staff_id else { return Ok(()) };
    if appointment.is_cancelled() || !appointment.is_active {
        return Ok(());
    }
    if count_overlap(conn, staff_id, &appointment.id, appointment.start_time, appointment.end_time).await? > 0 {
        return Err(AppError::Conflict("Staff member already has an appointment at this time".into()));
    }
    Ok(())
}

async fn insert_jobs(conn: &mut SqliteConnection, jobs: Vec<Job>) -> Result<(), AppError> {
    for job in jobs {
        sqlx::query("INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
            .bind(&job.id)
            .bind(&job.job_type)
            .bind(&job.payload)
            .bind(job.execute_at)
            .bind(&job.status)
            .bind(&job.error_message)
            .bind(job.created_at)
            .execute(&mut *conn)
            .await
            .map_err(AppError::Database)?;
    }
    Ok(())
}

async fn cancel_pending_jobs(conn: &mut SqliteConnection, appointment_id: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE jobs SET status = 'CANCELLED' WHERE json_extract(payload, '$.appointment_id') = ? AND status = 'PENDING'")
        .bind(appointment_id)
        .execute(conn)
        .await
        .map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepo {
    async fn create_with_jobs(&self, appointment: &Appointment, jobs: Vec<Job>) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin_with(WRITE_TX).await.map_err(AppError::Database)?;
        guard_staff_overlap(&mut tx, appointment).await?;

        let created = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (id, tenant_id, customer_name, customer_phone, customer_email, service_id, service_name, staff_id, staff_name, start_time, end_time, status, notes, price, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&appointment.id).bind(&appointment.tenant_id).bind(&appointment.customer_name)
            .bind(&appointment.customer_phone).bind(&appointment.customer_email)
            .bind(&appointment.service_id).bind(&appointment.service_name)
            .bind(&appointment.staff_id).bind(&appointment.staff_name)
            .bind(appointment.start_time).bind(appointment.end_time)
            .bind(&appointment.status).bind(&appointment.notes).bind(appointment.price)
            .bind(appointment.is_active).bind(appointment.created_at).bind(appointment.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        insert_jobs(&mut tx, jobs).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE tenant_id = ? AND id = ? AND is_active = 1")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE tenant_id = ? AND is_active = 1 ORDER BY start_time ASC")
            .bind(tenant_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, tenant_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = ? AND is_active = 1 AND start_time < ? AND end_time > ? ORDER BY start_time ASC"
        )
            .bind(tenant_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_staff(&self, tenant_id: &str, staff_id: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = ? AND staff_id = ? AND is_active = 1 ORDER BY start_time ASC"
        )
            .bind(tenant_id).bind(staff_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_phone(&self, tenant_id: &str, phone: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = ? AND customer_phone = ? AND is_active = 1 ORDER BY start_time DESC"
        )
            .bind(tenant_id).bind(phone)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin_with(WRITE_TX).await.map_err(AppError::Database)?;
        guard_staff_overlap(&mut tx, appointment).await?;

        let updated = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET customer_name=?, customer_phone=?, customer_email=?, service_id=?, service_name=?, staff_id=?, staff_name=?,
                start_time=?, end_time=?, status=?, notes=?, price=?, updated_at=?
             WHERE id=? AND tenant_id=? AND is_active = 1
             RETURNING *"
        )
            .bind(&appointment.customer_name).bind(&appointment.customer_phone).bind(&appointment.customer_email)
            .bind(&appointment.service_id).bind(&appointment.service_name)
            .bind(&appointment.staff_id).bind(&appointment.staff_name)
            .bind(appointment.start_time).bind(appointment.end_time)
            .bind(&appointment.status).bind(&appointment.notes).bind(appointment.price).bind(appointment.updated_at)
            .bind(&appointment.id).bind(&appointment.tenant_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn cancel(&self, appointment: &Appointment, jobs: Vec<Job>) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let cancelled = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = 'cancelled', notes = ?, updated_at = ? WHERE id = ? AND tenant_id = ? RETURNING *"
        )
            .bind(&appointment.notes).bind(appointment.updated_at)
            .bind(&appointment.id).bind(&appointment.tenant_id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        cancel_pending_jobs(&mut tx, &appointment.id).await?;
        insert_jobs(&mut tx, jobs).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }

    async fn soft_delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let result = sqlx::query("UPDATE appointments SET is_active = 0, updated_at = ? WHERE id = ? AND tenant_id = ? AND is_active = 1")
            .bind(Utc::now()).bind(id).bind(tenant_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Appointment not found".into()));
        }
        cancel_pending_jobs(&mut tx, id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
