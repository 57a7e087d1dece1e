use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AdminUser, tenant::CurrentTenant};
use crate::api::dtos::requests::{
    AppointmentListQuery, CancelAppointmentRequest, CreateAppointmentRequest,
    UpdateAppointmentRequest, UpdateStatusRequest,
};
use crate::domain::models::{
    appointment::{Appointment, AppointmentStatus, NewAppointmentParams},
    job::JOB_REMINDER,
    schedule::StaffSchedule,
    service::Service,
    tenant::Tenant,
};
use crate::domain::ports::ScheduleFilter;
use crate::domain::services::{
    appointment_query::{paginate, AppointmentFilter, DEFAULT_PER_PAGE},
    conflict::ConflictChecker,
    eligibility::staff_options,
    roster::Roster,
    scheduling::{self, booking_jobs, cancellation_jobs, day_bounds, reminder_job},
};
use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

fn parse_time(raw: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Validation(format!("Invalid {} (expected RFC 3339)", field)))
}

pub(crate) fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {} date (YYYY-MM-DD)", field)))
}

fn set_end_time(appointment: &mut Appointment, raw_end: &str) -> Result<(), AppError> {
    let end = parse_time(raw_end, "end_time")?;
    if end <= appointment.start_time {
        return Err(AppError::Validation("end_time must be after start_time".into()));
    }
    appointment.end_time = end;
    Ok(())
}

async fn find_appointment(state: &AppState, tenant_id: &str, id: &str) -> Result<Appointment, AppError> {
    state.appointment_repo.find_by_id(tenant_id, id).await?
        .ok_or(AppError::NotFound("Appointment not found".into()))
}

pub(crate) async fn find_bookable_service(state: &AppState, tenant_id: &str, service_id: &str) -> Result<Service, AppError> {
    let service = state.service_repo.find_by_id(tenant_id, service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    if !service.is_active {
        return Err(AppError::Validation(format!("Service '{}' is not available", service.name)));
    }
    Ok(service)
}

/// Every live appointment of the tenant touching the local day of `start`,
/// including bookings carried over from the evening before and, when `end`
/// runs past midnight, the next morning.
pub(crate) async fn day_snapshot(
    state: &AppState,
    tenant_id: &str,
    checker: &ConflictChecker,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Appointment>, AppError> {
    let (day_start, day_end) = day_bounds(checker.local_date(start), checker.tz());
    state.appointment_repo.list_by_range(tenant_id, day_start, day_end.max(end)).await
}

pub(crate) async fn day_roster(state: &AppState, tenant_id: &str, date: NaiveDate) -> Result<Vec<StaffSchedule>, AppError> {
    let filter = ScheduleFilter { from: Some(date), to: Some(date), ..Default::default() };
    state.schedule_repo.list(tenant_id, &filter).await
}

/// Validates and records `staff_id` on `appointment`.
async fn assign_staff(state: &AppState, tenant: &Tenant, appointment: &mut Appointment, staff_id: &str) -> Result<(), AppError> {
    let staff = state.user_repo.find_by_id(&tenant.id, staff_id).await?
        .ok_or(AppError::NotFound("Staff member not found".into()))?;

    let held = state.skill_repo.list_skills_for_staff(&staff.id).await?;
    let held_ids: HashSet<&str> = held.iter().map(|s| s.skill_id.as_str()).collect();
    let required = state.skill_repo.list_skill_ids_for_service(&appointment.service_id).await?;

    let checker = ConflictChecker::new(tenant.tz());
    let snapshot = day_snapshot(state, &tenant.id, &checker, appointment.start_time, appointment.end_time).await?;
    let shifts = day_roster(state, &tenant.id, checker.local_date(appointment.start_time)).await?;

    scheduling::ensure_assignable(&staff, &held_ids, &required, appointment, &snapshot, &Roster::new(&shifts), &checker)?;

    appointment.staff_id = Some(staff.id);
    appointment.staff_name = Some(staff.full_name);
    Ok(())
}

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.customer_name.trim().is_empty() || payload.customer_phone.trim().is_empty() {
        return Err(AppError::Validation("Customer name and phone are required".into()));
    }

    let now = Utc::now();
    let start = parse_time(&payload.start_time, "start_time")?;
    if start < now {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }

    let service = find_bookable_service(&state, &tenant.id, &payload.service_id).await?;

    let mut appointment = Appointment::new(
        NewAppointmentParams {
            tenant_id: tenant.id.clone(),
            customer_name: payload.customer_name.trim().to_string(),
            customer_phone: payload.customer_phone.trim().to_string(),
            customer_email: payload.customer_email.filter(|e| !e.trim().is_empty()),
            start,
            notes: payload.notes,
        },
        &service,
    );
    if let Some(end) = payload.end_time.as_deref() {
        set_end_time(&mut appointment, end)?;
    }

    if let Some(staff_id) = payload.staff_id.as_deref().filter(|s| !s.is_empty()) {
        assign_staff(&state, &tenant, &mut appointment, staff_id).await?;
    }

    let jobs = booking_jobs(&appointment, state.config.reminder_lead_hours, now);
    let created = state.appointment_repo.create_with_jobs(&appointment, jobs).await?;

    info!("Appointment {} booked for {} at {}", created.id, created.service_name, created.start_time);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Query(query): Query<AppointmentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status.as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<AppointmentStatus>)
        .transpose()
        .map_err(AppError::Validation)?;

    let filter = AppointmentFilter {
        status,
        from: query.from.as_deref().filter(|s| !s.is_empty()).map(|d| parse_date(d, "from")).transpose()?,
        to: query.to.as_deref().filter(|s| !s.is_empty()).map(|d| parse_date(d, "to")).transpose()?,
        query: query.q,
    };

    let snapshot = state.appointment_repo.list_by_tenant(&tenant.id).await?;
    let matching = filter.apply(snapshot, tenant.tz());

    Ok(Json(paginate(matching, query.page.unwrap_or(0), query.per_page.unwrap_or(DEFAULT_PER_PAGE))))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, appointment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(find_appointment(&state, &tenant.id, &appointment_id).await?))
}

pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, appointment_id)): Path<(String, String)>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut appointment = find_appointment(&state, &tenant.id, &appointment_id).await?;
    let original_start = appointment.start_time;

    let reschedules = payload.service_id.is_some()
        || payload.start_time.is_some()
        || payload.end_time.is_some()
        || payload.staff_id.is_some();
    if reschedules && appointment.status().is_terminal() {
        return Err(AppError::Conflict(format!("A {} appointment cannot be rescheduled", appointment.status())));
    }

    if let Some(name) = payload.customer_name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Customer name cannot be empty".into()));
        }
        appointment.customer_name = name.trim().to_string();
    }
    if let Some(phone) = payload.customer_phone {
        if phone.trim().is_empty() {
            return Err(AppError::Validation("Customer phone cannot be empty".into()));
        }
        appointment.customer_phone = phone.trim().to_string();
    }
    if let Some(email) = payload.customer_email {
        appointment.customer_email = Some(email).filter(|e| !e.trim().is_empty());
    }
    if let Some(notes) = payload.notes {
        appointment.notes = Some(notes);
    }

    if let Some(service_id) = payload.service_id.as_deref()
        && service_id != appointment.service_id {
        let service = find_bookable_service(&state, &tenant.id, service_id).await?;
        appointment.apply_service(&service);
    }
    if let Some(raw_start) = payload.start_time.as_deref() {
        let start = parse_time(raw_start, "start_time")?;
        if start != appointment.start_time && start < Utc::now() {
            return Err(AppError::Validation("Cannot reschedule into the past".into()));
        }
        let length = (appointment.end_time - appointment.start_time).num_minutes() as i32;
        appointment.reschedule(start, length);
    }
    if let Some(raw_end) = payload.end_time.as_deref() {
        set_end_time(&mut appointment, raw_end)?;
    }

    match payload.staff_id.as_deref() {
        Some("") => {
            appointment.staff_id = None;
            appointment.staff_name = None;
        }
        Some(staff_id) => assign_staff(&state, &tenant, &mut appointment, staff_id).await?,
        None if reschedules => {
            if let Some(staff_id) = appointment.staff_id.clone() {
                assign_staff(&state, &tenant, &mut appointment, &staff_id).await?;
            }
        }
        None => {}
    }

    appointment.updated_at = Utc::now();
    let updated = state.appointment_repo.update(&appointment).await?;

    // Only the reminder depends on the start time; a pending confirmation still goes out.
    if updated.start_time != original_start {
        state.job_repo.cancel_pending_jobs(&updated.id, JOB_REMINDER).await?;
        if let Some(job) = reminder_job(&updated, state.config.reminder_lead_hours, Utc::now()) {
            state.job_repo.create(&job).await?;
        }
    }

    info!("Appointment {} updated", updated.id);
    Ok(Json(updated))
}

async fn cancel(state: &AppState, tenant: &Tenant, mut appointment: Appointment, reason: Option<String>) -> Result<Appointment, AppError> {
    let tz = tenant.tz();
    let now = Utc::now();
    scheduling::ensure_cancellable(&appointment, now.with_timezone(&tz).date_naive(), tz)?;

    let note = match reason.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => format!("CANCELLED: {}", r),
        _ => "CANCELLED".to_string(),
    };
    appointment.append_note(&note);
    appointment.set_status(AppointmentStatus::Cancelled);

    let jobs = cancellation_jobs(&appointment, now);
    let cancelled = state.appointment_repo.cancel(&appointment, jobs).await?;
    info!("Appointment {} cancelled", cancelled.id);
    Ok(cancelled)
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, appointment_id)): Path<(String, String)>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let next: AppointmentStatus = payload.status.parse().map_err(AppError::Validation)?;
    let mut appointment = find_appointment(&state, &tenant.id, &appointment_id).await?;
    let current = appointment.status();

    scheduling::ensure_transition(current, next)?;
    if current == next {
        return Ok(Json(appointment));
    }

    if next == AppointmentStatus::Cancelled {
        return Ok(Json(cancel(&state, &tenant, appointment, None).await?));
    }

    appointment.set_status(next);
    let updated = state.appointment_repo.update(&appointment).await?;
    info!("Appointment {} moved from {} to {}", updated.id, current, next);
    Ok(Json(updated))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, appointment_id)): Path<(String, String)>,
    Json(payload): Json<CancelAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = find_appointment(&state, &tenant.id, &appointment_id).await?;
    Ok(Json(cancel(&state, &tenant, appointment, payload.reason).await?))
}

pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, appointment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.appointment_repo.soft_delete(&tenant.id, &appointment_id).await?;
    warn!("Appointment {} deleted", appointment_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

/// Staff the appointment could be assigned to, with qualification and
/// availability flags.
pub async fn get_staff_options(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, appointment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = find_appointment(&state, &tenant.id, &appointment_id).await?;

    let staff = state.user_repo.list_by_tenant(&tenant.id).await?;
    let staff_skills = state.skill_repo.list_staff_skills(&tenant.id).await?;
    let required = state.skill_repo.list_skill_ids_for_service(&appointment.service_id).await?;

    let checker = ConflictChecker::new(tenant.tz());
    let snapshot = day_snapshot(&state, &tenant.id, &checker, appointment.start_time, appointment.end_time).await?;
    let shifts = day_roster(&state, &tenant.id, checker.local_date(appointment.start_time)).await?;

    Ok(Json(staff_options(&appointment, &staff, &staff_skills, &required, &snapshot, &Roster::new(&shifts), &checker)))
}
