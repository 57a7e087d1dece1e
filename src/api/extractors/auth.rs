use axum::{
    extract::{FromRequestParts, FromRef, Path},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::auth::{Claims, TOKEN_AUDIENCE};
use crate::domain::models::user::User;
use std::collections::HashMap;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::{warn, Span};

/// Any signed-in user. On `/{tenant_id}/...` routes the token must belong to
/// that tenant.
pub struct AuthUser(pub User);

/// Signed-in user with the `ADMIN` role.
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

        let access_token = cookies.get("access_token")
            .ok_or(StatusCode::UNAUTHORIZED)?
            .value()
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_ed_pem(app_state.config.jwt_public_key.as_bytes())
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_issuer(&[app_state.config.auth_issuer.as_str()]);

        let claims = decode::<Claims>(&access_token, &decoding_key, &validation)
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .claims;

        let method = &parts.method;
        if method != "GET" && method != "HEAD" && method != "OPTIONS" {
            let csrf_header_val = parts.headers.get("X-CSRF-Token")
                .ok_or(StatusCode::FORBIDDEN)?
                .to_str()
                .map_err(|_| StatusCode::FORBIDDEN)?;

            if csrf_header_val != claims.csrf_token {
                return Err(StatusCode::FORBIDDEN);
            }
        }

        if let Ok(Path(params)) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await
            && let Some(path_tenant) = params.get("tenant_id")
            && *path_tenant != claims.tenant_id {
            warn!("User {} of tenant {} tried to access tenant {}", claims.sub, claims.tenant_id, path_tenant);
            return Err(StatusCode::FORBIDDEN);
        }

        let user = User {
            id: claims.sub,
            tenant_id: claims.tenant_id,
            username: String::new(),
            password_hash: String::new(),
            role: claims.role,
            full_name: claims.full_name,
            image_url: None,
            is_active: true,
            created_at: chrono::Utc::now(),
        };

        Span::current().record("tenant_id", &user.tenant_id);
        Span::current().record("user_id", &user.id);

        Ok(AuthUser(user))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(AdminUser(user))
    }
}
