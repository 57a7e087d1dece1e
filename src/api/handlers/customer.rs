use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AdminUser, tenant::CurrentTenant};
use crate::api::dtos::requests::PhoneQuery;
use crate::domain::models::appointment::Appointment;
use crate::domain::services::appointment_query::CustomerStats;
use crate::error::AppError;
use std::sync::Arc;

async fn history_for(state: &AppState, tenant_id: &str, phone: &str) -> Result<Vec<Appointment>, AppError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AppError::Validation("phone is required".into()));
    }
    state.appointment_repo.list_by_phone(tenant_id, phone).await
}

pub async fn customer_history(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Query(query): Query<PhoneQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(history_for(&state, &tenant.id, &query.phone).await?))
}

pub async fn customer_stats(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Query(query): Query<PhoneQuery>,
) -> Result<impl IntoResponse, AppError> {
    let history = history_for(&state, &tenant.id, &query.phone).await?;
    Ok(Json(CustomerStats::from_history(&history)))
}
