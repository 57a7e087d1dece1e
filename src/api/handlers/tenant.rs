use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{
    requests::{CreateTenantRequest, UpdateTenantRequest},
    responses::TenantCreatedResponse
};
use crate::api::extractors::auth::{AdminUser, AuthUser};
use crate::domain::models::{tenant::Tenant, user::{User, ROLE_ADMIN}};
use crate::domain::services::auth_service::random_token;
use std::sync::Arc;
use chrono_tz::Tz;
use crate::error::AppError;
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use tracing::info;

const ADMIN_USERNAME: &str = "admin";

fn validate_timezone(timezone: &str) -> Result<(), AppError> {
    timezone.parse::<Tz>()
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("Unknown time zone '{}'", timezone)))
}

pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() || payload.slug.trim().is_empty() {
        return Err(AppError::Validation("Name and slug are required".into()));
    }
    let timezone = payload.timezone.unwrap_or_else(|| state.config.default_timezone.clone());
    validate_timezone(&timezone)?;

    let mut tenant = Tenant::new(payload.name, payload.slug, timezone);
    tenant.logo_url = payload.logo_url;

    let created_tenant = state.tenant_repo.create(&tenant).await?;

    info!("Tenant created: {}", created_tenant.id);

    let admin_password = random_token(16);

    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::default()
        .hash_password(admin_password.as_bytes(), &salt)
        .map_err(|_| AppError::Internal)?
        .to_string();

    let admin_user = User::new(
        created_tenant.id.clone(),
        ADMIN_USERNAME.to_string(),
        password_hash,
        ROLE_ADMIN,
        "Administrator".to_string(),
    );
    state.user_repo.create(&admin_user).await?;

    Ok((StatusCode::CREATED, Json(TenantCreatedResponse {
        tenant_id: created_tenant.id,
        admin_username: ADMIN_USERNAME.to_string(),
        admin_secret: admin_password,
    })))
}

pub async fn get_tenant_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = state.tenant_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Tenant not found".into()))?;

    Ok(Json(tenant))
}

pub async fn update_tenant(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<UpdateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = admin.tenant_id;
    let mut tenant = state.tenant_repo.find_by_id(&tenant_id).await?
        .ok_or(AppError::NotFound("Tenant not found".into()))?;

    if let Some(name) = payload.name {
        tenant.name = name;
    }
    if let Some(timezone) = payload.timezone {
        validate_timezone(&timezone)?;
        tenant.timezone = timezone;
    }
    if let Some(logo) = payload.logo_url {
        tenant.logo_url = Some(logo);
    }

    let updated = state.tenant_repo.update(&tenant).await?;
    info!("Tenant updated: {}", tenant_id);
    Ok(Json(updated))
}

pub async fn get_current_tenant(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = user.0.tenant_id;
    let tenant = state.tenant_repo.find_by_id(&tenant_id).await?
        .ok_or(AppError::NotFound("Tenant not found".into()))?;
    Ok(Json(tenant))
}
