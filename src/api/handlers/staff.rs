use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::ScheduleListQuery;
use crate::api::extractors::{auth::AuthUser, tenant::CurrentTenant};
use crate::api::handlers::schedule::schedule_filter;
use crate::error::AppError;
use std::sync::Arc;

/// The signed-in staff member's own appointments.
pub async fn my_appointments(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.appointment_repo.list_by_staff(&tenant.id, &user.id).await?))
}

/// The signed-in staff member's shifts; `user_id` in the query is ignored.
pub async fn my_schedules(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    AuthUser(user): AuthUser,
    Query(query): Query<ScheduleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut filter = schedule_filter(query)?;
    filter.user_id = Some(user.id);
    Ok(Json(state.schedule_repo.list(&tenant.id, &filter).await?))
}
