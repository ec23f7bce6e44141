use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Query},
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::AppState;
use crate::access::{AccessContext, AccessRequirement};
use crate::database::is_unique_violation;
use crate::database::models::{CollectEmailInput, CreateSignupInput, SignupCount};
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, PageQuery};
use crate::services::is_valid_email;

/// Landing-page collector. Replies with a bare `{success}` / `{error}` body
/// rather than the API envelope.
pub async fn collect_email(
    state: Data<AppState>,
    input: Option<Json<CollectEmailInput>>,
) -> HttpResponse {
    let email = input.and_then(|input| input.into_inner().email);
    let email = match email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => email.to_string(),
        _ => return HttpResponse::BadRequest().json(json!({ "error": "Email is required" })),
    };

    if !is_valid_email(&email) {
        return HttpResponse::BadRequest().json(json!({ "error": "Invalid email address" }));
    }

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    match state.signup_sheet.append_row(&[email, timestamp]).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(e) => {
            log::error!("Failed to append collected email: {:#}", e);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to save email" }))
        }
    }
}

pub async fn create_signup(
    state: Data<AppState>,
    input: Json<CreateSignupInput>,
) -> Result<HttpResponse> {
    let input = input.into_inner();
    if input.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()).into());
    }
    if !is_valid_email(&input.email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()).into());
    }

    let signup = match state.signup_repository.create(&input).await {
        Ok(signup) => signup,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::BadRequest("Email already registered".to_string()).into());
        }
        Err(e) => {
            log::error!("Failed to store signup: {}", e);
            return Err(AppError::DatabaseError(e).into());
        }
    };

    log::info!("New signup {} from {}", signup.id, signup.source);
    Ok(ApiResponse::created(signup))
}

pub async fn list_signups(
    ctx: AccessContext,
    state: Data<AppState>,
    page: Query<PageQuery>,
) -> Result<HttpResponse> {
    ctx.require(AccessRequirement::none().admin())?;

    let signups = state
        .signup_repository
        .list(page.offset(), page.limit())
        .await
        .map_err(AppError::DatabaseError)?;

    Ok(ApiResponse::success(signups))
}

pub async fn count_signups(state: Data<AppState>) -> Result<HttpResponse> {
    let count = state
        .signup_repository
        .count()
        .await
        .map_err(AppError::DatabaseError)?;

    Ok(ApiResponse::success(SignupCount { count }))
}
