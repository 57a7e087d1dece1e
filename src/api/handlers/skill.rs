use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AdminUser, tenant::CurrentTenant};
use crate::api::dtos::{
    requests::{CreateSkillRequest, SetSkillServicesRequest, UpdateSkillRequest},
    responses::SkillServicesResponse,
};
use crate::domain::models::skill::Skill;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.skill_repo.list(&tenant.id).await?))
}

pub async fn create_skill(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Json(payload): Json<CreateSkillRequest>,
) -> Result<impl IntoResponse, AppError> {
    let skill_name = payload.skill_name.trim().to_string();
    if skill_name.is_empty() {
        return Err(AppError::Validation("Skill name is required".into()));
    }

    let skill = Skill::new(tenant.id, skill_name, payload.description);
    let created = state.skill_repo.create(&skill).await?;
    info!("Skill created: {} ({})", created.skill_name, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_skill(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, skill_id)): Path<(String, String)>,
    Json(payload): Json<UpdateSkillRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut skill = state.skill_repo.find_by_id(&tenant.id, &skill_id).await?
        .ok_or(AppError::NotFound("Skill not found".into()))?;

    if let Some(name) = payload.skill_name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Skill name is required".into()));
        }
        skill.skill_name = name;
    }
    if let Some(description) = payload.description {
        skill.description = Some(description);
    }

    Ok(Json(state.skill_repo.update(&skill).await?))
}

pub async fn delete_skill(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, skill_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.skill_repo.delete(&tenant.id, &skill_id).await?;
    info!("Skill deleted: {}", skill_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn get_skill_services(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, skill_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let skill = state.skill_repo.find_by_id(&tenant.id, &skill_id).await?
        .ok_or(AppError::NotFound("Skill not found".into()))?;

    let service_ids = state.skill_repo.list_service_ids_for_skill(&skill.id).await?;
    Ok(Json(SkillServicesResponse { skill_id: skill.id, service_ids }))
}

/// Replaces the set of services this skill qualifies staff for.
pub async fn set_skill_services(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, skill_id)): Path<(String, String)>,
    Json(payload): Json<SetSkillServicesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let skill = state.skill_repo.find_by_id(&tenant.id, &skill_id).await?
        .ok_or(AppError::NotFound("Skill not found".into()))?;

    let mut service_ids = payload.service_ids;
    service_ids.sort();
    service_ids.dedup();
    for service_id in &service_ids {
        if state.service_repo.find_by_id(&tenant.id, service_id).await?.is_none() {
            return Err(AppError::Validation(format!("Unknown service '{}'", service_id)));
        }
    }

    state.skill_repo.set_skill_services(&skill.id, &service_ids).await?;
    info!("Skill {} now covers {} services", skill.id, service_ids.len());

    Ok(Json(SkillServicesResponse { skill_id: skill.id, service_ids }))
}
