use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AdminUser, tenant::CurrentTenant};
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.job_repo.list_jobs(&tenant.id).await?))
}
