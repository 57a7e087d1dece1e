use crate::domain::{models::{appointment::Appointment, job::Job}, ports::AppointmentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, PgConnection, PgPool};
use chrono::{DateTime, Utc};

const OVERLAP_QUERY: &str = "SELECT COUNT(*) as count FROM appointments
     WHERE staff_id = $1 AND id != $2 AND is_active = TRUE AND status != 'cancelled'
     AND start_time < $3 AND end_time > $4";

pub struct PostgresAppointmentRepo {
    pool: PgPool,
}

impl PostgresAppointmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn count_overlap(conn: &mut PgConnection, staff_id: &str, exclude_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError> {
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
///
/// Writers for the same staff member are serialized by a transaction-scoped advisory
/// lock, so two concurrent bookings cannot both pass the count under READ COMMITTED.
async fn guard_staff_overlap(conn: &mut PgConnection, appointment: &Appointment) -> Result<(), AppError> {
    let Some(staff_id) = &appointment.staff_id else { return Ok(()) };
    if appointment.is_cancelled() || !appointment.is_active {
        return Ok(());
    }
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(staff_id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;
    if count_overlap(conn, staff_id, &appointment.id, appointment.start_time, appointment.end_time).await? > 0 {
        return Err(AppError::Conflict("Staff member already has an appointment at this time".into()));
    }
    Ok(())
}

async fn insert_jobs(conn: &mut PgConnection, jobs: Vec<Job>) -> Result<(), AppError> {
    for job in jobs {
        sqlx::query("INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
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

async fn cancel_pending_jobs(conn: &mut PgConnection, appointment_id: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE jobs SET status = 'CANCELLED' WHERE payload->>'appointment_id' = $1 AND status = 'PENDING'")
        .bind(appointment_id)
        .execute(conn)
        .await
        .map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepo {
    async fn create_with_jobs(&self, appointment: &Appointment, jobs: Vec<Job>) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        guard_staff_overlap(&mut tx, appointment).await?;

        let created = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (id, tenant_id, customer_name, customer_phone, customer_email, service_id, service_name, staff_id, staff_name, start_time, end_time, status, notes, price, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
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
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE tenant_id = $1 AND id = $2 AND is_active = TRUE")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE tenant_id = $1 AND is_active = TRUE ORDER BY start_time ASC")
            .bind(tenant_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, tenant_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = $1 AND is_active = TRUE AND start_time < $2 AND end_time > $3 ORDER BY start_time ASC"
        )
            .bind(tenant_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_staff(&self, tenant_id: &str, staff_id: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = $1 AND staff_id = $2 AND is_active = TRUE ORDER BY start_time ASC"
        )
            .bind(tenant_id).bind(staff_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_phone(&self, tenant_id: &str, phone: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = $1 AND customer_phone = $2 AND is_active = TRUE ORDER BY start_time DESC"
        )
            .bind(tenant_id).bind(phone)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        guard_staff_overlap(&mut tx, appointment).await?;

        let updated = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET customer_name=$1, customer_phone=$2, customer_email=$3, service_id=$4, service_name=$5, staff_id=$6, staff_name=$7,
                start_time=$8, end_time=$9, status=$10, notes=$11, price=$12, updated_at=$13
             WHERE id=$14 AND tenant_id=$15 AND is_active = TRUE
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
            "UPDATE appointments SET status = 'cancelled', notes = $1, updated_at = $2 WHERE id = $3 AND tenant_id = $4 RETURNING *"
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
        let result = sqlx::query("UPDATE appointments SET is_active = FALSE, updated_at = $1 WHERE id = $2 AND tenant_id = $3 AND is_active = TRUE")
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
