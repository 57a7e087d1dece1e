use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AdminUser, tenant::CurrentTenant};
use crate::api::dtos::requests::{CreateServiceRequest, ServiceListQuery, UpdateServiceRequest};
use crate::domain::models::service::Service;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

fn validate(service: &Service) -> Result<(), AppError> {
    if service.name.trim().is_empty() {
        return Err(AppError::Validation("Service name is required".into()));
    }
    if service.price < 0 {
        return Err(AppError::Validation("Price cannot be negative".into()));
    }
    if service.duration_min <= 0 {
        return Err(AppError::Validation("Duration must be positive".into()));
    }
    Ok(())
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    Query(query): Query<ServiceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut services = state.service_repo.list(&tenant.id).await?;
    if query.active_only.unwrap_or(false) {
        services.retain(|s| s.is_active);
    }
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    Path((_, service_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.service_repo.find_by_id(&tenant.id, &service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    Ok(Json(service))
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = Service::new(tenant.id, payload.name, payload.description, payload.price, payload.duration_min);
    service.is_active = payload.is_active.unwrap_or(true);
    validate(&service)?;

    let created = state.service_repo.create(&service).await?;
    info!("Service created: {} ({})", created.name, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, service_id)): Path<(String, String)>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = state.service_repo.find_by_id(&tenant.id, &service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    if let Some(name) = payload.name { service.name = name; }
    if let Some(description) = payload.description { service.description = Some(description); }
    if let Some(price) = payload.price { service.price = price; }
    if let Some(duration_min) = payload.duration_min { service.duration_min = duration_min; }
    if let Some(is_active) = payload.is_active { service.is_active = is_active; }
    validate(&service)?;

    let updated = state.service_repo.update(&service).await?;
    info!("Service updated: {}", updated.id);
    Ok(Json(updated))
}

/// Services referenced by appointments cannot be removed; deactivate them instead.
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, service_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.service_repo.delete(&tenant.id, &service_id).await?;
    info!("Service deleted: {}", service_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
