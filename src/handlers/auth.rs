use actix_web::{
    HttpResponse, Result,
    web::{Data, Query},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{Identity, provider::generate_state};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRedirect {
    pub url: String,
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutRedirect {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutQuery {
    pub return_to: Option<String>,
}

pub async fn login(state: Data<AppState>) -> Result<HttpResponse> {
    if !state.identity_provider.is_configured() {
        return Err(AppError::BadRequest("Identity provider is not configured".to_string()).into());
    }

    let login_state = generate_state();
    let url = state
        .identity_provider
        .login_url(&login_state)
        .map_err(AppError::from)?;

    Ok(ApiResponse::success(LoginRedirect {
        url: url.to_string(),
        state: login_state,
    }))
}

pub async fn logout(state: Data<AppState>, query: Query<LogoutQuery>) -> Result<HttpResponse> {
    if !state.identity_provider.is_configured() {
        return Err(AppError::BadRequest("Identity provider is not configured".to_string()).into());
    }

    let return_to = query
        .return_to
        .clone()
        .unwrap_or_else(|| state.config.cors_origins.first().cloned().unwrap_or_default());
    let url = state
        .identity_provider
        .logout_url(&return_to)
        .map_err(AppError::from)?;

    Ok(ApiResponse::success(LogoutRedirect {
        url: url.to_string(),
    }))
}

pub async fn me(identity: Identity, state: Data<AppState>) -> Result<HttpResponse> {
    let user = state
        .user_repository
        .upsert_from_identity(&identity)
        .await
        .map_err(|e| {
            log::error!("Failed to sync user {}: {}", identity.id, e);
            AppError::DatabaseError(e)
        })?;

    Ok(ApiResponse::success(user))
}

pub async fn complete_onboarding(
    identity: Identity,
    state: Data<AppState>,
) -> Result<HttpResponse> {
    state
        .user_repository
        .upsert_from_identity(&identity)
        .await
        .map_err(AppError::DatabaseError)?;

    let user = state
        .user_repository
        .mark_onboarding_complete(&identity.id)
        .await
        .map_err(AppError::DatabaseError)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    log::info!("User {} completed onboarding", identity.id);
    Ok(ApiResponse::success(user))
}
