use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AdminUser, tenant::CurrentTenant};
use crate::api::dtos::requests::{CreateScheduleRequest, ScheduleListQuery, UpdateScheduleRequest};
use crate::api::handlers::{appointment::parse_date, timeslot::parse_clock};
use crate::domain::models::schedule::{StaffSchedule, SCHEDULE_STATUSES};
use crate::domain::ports::ScheduleFilter;
use crate::error::AppError;
use chrono::NaiveTime;
use std::sync::Arc;
use tracing::info;

fn validate(schedule: &StaffSchedule) -> Result<(), AppError> {
    if schedule.shift.trim().is_empty() {
        return Err(AppError::Validation("Shift is required".into()));
    }
    if schedule.end_time <= schedule.start_time {
        return Err(AppError::Validation("end_time must be after start_time".into()));
    }
    if !SCHEDULE_STATUSES.contains(&schedule.status.as_str()) {
        return Err(AppError::Validation(format!("Unknown schedule status '{}'", schedule.status)));
    }
    Ok(())
}

/// Filter from query parameters; blank values are ignored.
pub(crate) fn schedule_filter(query: ScheduleListQuery) -> Result<ScheduleFilter, AppError> {
    Ok(ScheduleFilter {
        user_id: query.user_id.filter(|s| !s.is_empty()),
        from: query.from.as_deref().filter(|s| !s.is_empty()).map(|d| parse_date(d, "from")).transpose()?,
        to: query.to.as_deref().filter(|s| !s.is_empty()).map(|d| parse_date(d, "to")).transpose()?,
        status: query.status.filter(|s| !s.is_empty()).map(|s| s.to_lowercase()),
    })
}

/// Earliest start and latest end among the tenant's active slots of `shift`.
async fn shift_hours(state: &AppState, tenant_id: &str, shift: &str) -> Result<(NaiveTime, NaiveTime), AppError> {
    let slots = state.timeslot_repo.list(tenant_id).await?;
    let in_shift = slots.iter().filter(|s| s.is_active && s.shift.eq_ignore_ascii_case(shift));

    let start = in_shift.clone().map(|s| s.start_time).min();
    let end = in_shift.map(|s| s.end_time).max();
    start.zip(end).ok_or_else(|| {
        AppError::Validation(format!("No active time slots for shift '{}'; give start_time and end_time", shift))
    })
}

pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Query(query): Query<ScheduleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = schedule_filter(query)?;
    Ok(Json(state.schedule_repo.list(&tenant.id, &filter).await?))
}

pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let staff = state.user_repo.find_by_id(&tenant.id, &payload.user_id).await?
        .ok_or(AppError::NotFound("Staff member not found".into()))?;
    if !staff.is_assignable() {
        return Err(AppError::Validation(format!("{} cannot be scheduled", staff.full_name)));
    }

    let work_date = parse_date(&payload.work_date, "work")?;
    let shift = payload.shift.trim().to_string();
    let (start_time, end_time) = match (payload.start_time.as_deref(), payload.end_time.as_deref()) {
        (Some(start), Some(end)) => (parse_clock(start, "start_time")?, parse_clock(end, "end_time")?),
        (None, None) => shift_hours(&state, &tenant.id, &shift).await?,
        _ => return Err(AppError::Validation("Give both start_time and end_time, or neither".into())),
    };

    let mut schedule = StaffSchedule::new(tenant.id, staff.id, work_date, shift, start_time, end_time);
    if let Some(status) = payload.status {
        schedule.status = status.to_lowercase();
    }
    schedule.note = payload.note.filter(|n| !n.trim().is_empty());
    validate(&schedule)?;

    let created = state.schedule_repo.create(&schedule).await?;
    info!("Shift {} on {} scheduled for {}", created.shift, created.work_date, staff.full_name);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, schedule_id)): Path<(String, String)>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut schedule = state.schedule_repo.find_by_id(&tenant.id, &schedule_id).await?
        .ok_or(AppError::NotFound("Schedule not found".into()))?;

    if let Some(raw) = payload.work_date.as_deref() { schedule.work_date = parse_date(raw, "work")?; }
    if let Some(shift) = payload.shift { schedule.shift = shift.trim().to_string(); }
    if let Some(raw) = payload.start_time.as_deref() { schedule.start_time = parse_clock(raw, "start_time")?; }
    if let Some(raw) = payload.end_time.as_deref() { schedule.end_time = parse_clock(raw, "end_time")?; }
    if let Some(status) = payload.status { schedule.status = status.to_lowercase(); }
    if let Some(note) = payload.note { schedule.note = Some(note).filter(|n| !n.trim().is_empty()); }
    validate(&schedule)?;

    let updated = state.schedule_repo.update(&schedule).await?;
    info!("Schedule {} updated ({})", updated.id, updated.status);
    Ok(Json(updated))
}

pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, schedule_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.schedule_repo.delete(&tenant.id, &schedule_id).await?;
    info!("Schedule deleted: {}", schedule_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
