use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AdminUser, tenant::CurrentTenant};
use crate::api::dtos::requests::{
    CreateTimeSlotRequest, SlotAvailabilityQuery, TimeSlotListQuery, UpdateTimeSlotRequest,
};
use crate::api::handlers::appointment::{day_roster, day_snapshot, find_bookable_service, parse_date};
use crate::domain::models::{
    appointment::{Appointment, NewAppointmentParams},
    timeslot::TimeSlot,
};
use crate::domain::services::{
    availability::{slot_start, summarize, SlotAvailability},
    conflict::ConflictChecker,
    eligibility::staff_options,
    roster::Roster,
};
use crate::error::AppError;
use chrono::NaiveTime;
use std::sync::Arc;
use tracing::info;

/// Parses a wall-clock time given as `HH:MM` or `HH:MM:SS`.
pub(crate) fn parse_clock(raw: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid {} (expected HH:MM)", field)))
}

fn validate(slot: &TimeSlot) -> Result<(), AppError> {
    if slot.shift.trim().is_empty() {
        return Err(AppError::Validation("Shift is required".into()));
    }
    if slot.end_time <= slot.start_time {
        return Err(AppError::Validation("end_time must be after start_time".into()));
    }
    Ok(())
}

async fn find_slot(state: &AppState, tenant_id: &str, id: &str) -> Result<TimeSlot, AppError> {
    state.timeslot_repo.find_by_id(tenant_id, id).await?
        .ok_or(AppError::NotFound("Time slot not found".into()))
}

pub async fn list_timeslots(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    Query(query): Query<TimeSlotListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut slots = state.timeslot_repo.list(&tenant.id).await?;
    if query.active_only.unwrap_or(false) {
        slots.retain(|s| s.is_active);
    }
    if let Some(shift) = query.shift.as_deref().filter(|s| !s.is_empty()) {
        slots.retain(|s| s.shift.eq_ignore_ascii_case(shift));
    }
    Ok(Json(slots))
}

pub async fn create_timeslot(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Json(payload): Json<CreateTimeSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut slot = TimeSlot::new(
        tenant.id,
        payload.shift.trim().to_string(),
        parse_clock(&payload.start_time, "start_time")?,
        parse_clock(&payload.end_time, "end_time")?,
    );
    slot.is_active = payload.is_active.unwrap_or(true);
    validate(&slot)?;

    let created = state.timeslot_repo.create(&slot).await?;
    info!("Time slot created: {} {}-{}", created.shift, created.start_time, created.end_time);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_timeslot(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, slot_id)): Path<(String, String)>,
    Json(payload): Json<UpdateTimeSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut slot = find_slot(&state, &tenant.id, &slot_id).await?;

    if let Some(shift) = payload.shift { slot.shift = shift.trim().to_string(); }
    if let Some(raw) = payload.start_time.as_deref() { slot.start_time = parse_clock(raw, "start_time")?; }
    if let Some(raw) = payload.end_time.as_deref() { slot.end_time = parse_clock(raw, "end_time")?; }
    if let Some(is_active) = payload.is_active { slot.is_active = is_active; }
    validate(&slot)?;

    let updated = state.timeslot_repo.update(&slot).await?;
    info!("Time slot updated: {}", updated.id);
    Ok(Json(updated))
}

/// Slots are never removed, only retired.
pub async fn deactivate_timeslot(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, slot_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let mut slot = find_slot(&state, &tenant.id, &slot_id).await?;
    slot.is_active = false;
    let updated = state.timeslot_repo.update(&slot).await?;
    info!("Time slot deactivated: {}", updated.id);
    Ok(Json(updated))
}

/// For each active slot on `date`, how many qualified on-duty staff could take
/// `service_id` starting at the slot, and how many of them are still free.
pub async fn slot_availability(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    Query(query): Query<SlotAvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&query.date, "requested")?;
    let service = find_bookable_service(&state, &tenant.id, &query.service_id).await?;

    let mut slots = state.timeslot_repo.list(&tenant.id).await?;
    slots.retain(|s| s.is_active);
    if let Some(slot_id) = query.slot_id.as_deref().filter(|s| !s.is_empty()) {
        slots.retain(|s| s.id == slot_id);
        if slots.is_empty() {
            return Err(AppError::NotFound("Time slot not found".into()));
        }
    }

    let tz = tenant.tz();
    let checker = ConflictChecker::new(tz);
    // Unsaved bookings, one per slot, evaluated like a real assignment.
    let candidates: Vec<Appointment> = slots
        .iter()
        .map(|slot| {
            Appointment::new(
                NewAppointmentParams {
                    tenant_id: tenant.id.clone(),
                    customer_name: String::new(),
                    customer_phone: String::new(),
                    customer_email: None,
                    start: slot_start(slot, date, tz),
                    notes: None,
                },
                &service,
            )
        })
        .collect();

    let Some(first) = candidates.first() else { return Ok(Json(Vec::<SlotAvailability>::new())) };
    let latest_end = candidates.iter().map(|c| c.end_time).max().unwrap_or(first.end_time);
    let snapshot = day_snapshot(&state, &tenant.id, &checker, first.start_time, latest_end).await?;
    let shifts = day_roster(&state, &tenant.id, date).await?;
    let roster = Roster::new(&shifts);

    let staff = state.user_repo.list_by_tenant(&tenant.id).await?;
    let staff_skills = state.skill_repo.list_staff_skills(&tenant.id).await?;
    let required = state.skill_repo.list_skill_ids_for_service(&service.id).await?;

    let availability: Vec<SlotAvailability> = slots
        .iter()
        .zip(&candidates)
        .map(|(slot, candidate)| {
            let options = staff_options(candidate, &staff, &staff_skills, &required, &snapshot, &roster, &checker);
            summarize(slot, &options)
        })
        .collect();
    Ok(Json(availability))
}
