use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AdminUser, tenant::CurrentTenant};
use crate::api::dtos::{
    requests::{CreateMemberRequest, SetMemberSkillsRequest, UpdateMemberRequest},
    responses::MemberResponse,
};
use crate::domain::models::{skill::StaffSkill, user::{User, ROLE_ADMIN, ROLE_STAFF}};
use crate::domain::services::eligibility::SkillTag;
use std::collections::HashMap;
use std::sync::Arc;
use crate::error::AppError;
use argon2::{password_hash::{SaltString, PasswordHasher}, Argon2};
use rand::rngs::OsRng;
use tracing::{info, error};

fn tags(rows: Vec<StaffSkill>) -> Vec<SkillTag> {
    rows.into_iter()
        .map(|s| SkillTag { id: s.skill_id, skill_name: s.skill_name })
        .collect()
}

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = payload.role.as_deref().unwrap_or(ROLE_STAFF).to_uppercase();
    if role != ROLE_ADMIN && role != ROLE_STAFF {
        return Err(AppError::Validation(format!("Unknown role '{}'", role)));
    }
    if payload.username.trim().is_empty() || payload.full_name.trim().is_empty() {
        return Err(AppError::Validation("Username and full name are required".into()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::Validation("Password must be at least 8 characters".into()));
    }
    if state.user_repo.find_by_username(&tenant.id, &payload.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|_| AppError::Internal)?
        .to_string();

    let mut user = User::new(tenant.id, payload.username, password_hash, &role, payload.full_name);
    user.image_url = payload.image_url;
    let created = state.user_repo.create(&user).await?;

    info!("Created {} account: {}", created.role, created.id);

    Ok((StatusCode::CREATED, Json(MemberResponse::new(created, vec![]))))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let members = state.user_repo.list_by_tenant(&tenant.id).await?;

    let mut skills_by_user: HashMap<String, Vec<StaffSkill>> = HashMap::new();
    for row in state.skill_repo.list_staff_skills(&tenant.id).await? {
        skills_by_user.entry(row.user_id.clone()).or_default().push(row);
    }

    let response: Vec<MemberResponse> = members
        .into_iter()
        .map(|u| {
            let skills = tags(skills_by_user.remove(&u.id).unwrap_or_default());
            MemberResponse::new(u, skills)
        })
        .collect();

    Ok(Json(response))
}

pub async fn update_member(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    AdminUser(admin): AdminUser,
    Path((_, user_id)): Path<(String, String)>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = state.user_repo.find_by_id(&tenant.id, &user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if let Some(full_name) = payload.full_name {
        if full_name.trim().is_empty() {
            return Err(AppError::Validation("Full name cannot be empty".into()));
        }
        user.full_name = full_name;
    }
    if let Some(image_url) = payload.image_url {
        user.image_url = Some(image_url).filter(|u| !u.is_empty());
    }
    if let Some(is_active) = payload.is_active {
        if !is_active && admin.id == user.id {
            return Err(AppError::Conflict("Cannot deactivate yourself".into()));
        }
        user.is_active = is_active;
    }

    let updated = state.user_repo.update(&user).await?;
    let skills = tags(state.skill_repo.list_skills_for_staff(&updated.id).await?);
    info!("Updated member {}", updated.id);
    Ok(Json(MemberResponse::new(updated, skills)))
}

pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    AdminUser(admin): AdminUser,
    Path((_, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    if admin.id == user_id {
        return Err(AppError::Conflict("Cannot delete yourself".into()));
    }

    let target = state.user_repo.find_by_id(&tenant.id, &user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    match state.user_repo.delete(&tenant.id, &target.id).await {
        Ok(_) => {
            info!("Deleted user {}", user_id);
            Ok(Json(serde_json::json!({"status": "deleted"})))
        },
        Err(e) => {
            error!("Failed to delete user {}: {:?}", user_id, e);
            Err(e)
        }
    }
}

pub async fn get_member_skills(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&tenant.id, &user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let skills = tags(state.skill_repo.list_skills_for_staff(&user.id).await?);
    Ok(Json(skills))
}

pub async fn set_member_skills(
    State(state): State<Arc<AppState>>,
    CurrentTenant(tenant): CurrentTenant,
    _admin: AdminUser,
    Path((_, user_id)): Path<(String, String)>,
    Json(payload): Json<SetMemberSkillsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&tenant.id, &user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let mut skill_ids = payload.skill_ids;
    skill_ids.sort();
    skill_ids.dedup();
    for skill_id in &skill_ids {
        if state.skill_repo.find_by_id(&tenant.id, skill_id).await?.is_none() {
            return Err(AppError::Validation(format!("Unknown skill '{}'", skill_id)));
        }
    }

    state.skill_repo.set_staff_skills(&user.id, &skill_ids).await?;
    info!("Assigned {} skills to {}", skill_ids.len(), user.id);

    let skills = tags(state.skill_repo.list_skills_for_staff(&user.id).await?);
    Ok(Json(skills))
}
