use actix_web::{
    HttpResponse, Result,
    web::{Data, Json},
};

use crate::AppState;
use crate::access::{AccessGate, AccessRequirement, AccessState, GateResponse};
use crate::auth::Identity;
use crate::handlers::shared::ApiResponse;

/// Role and permissions of the caller. Anonymous callers resolve to free.
pub async fn get_access(
    identity: Option<Identity>,
    state: Data<AppState>,
) -> Result<HttpResponse> {
    let resolution = state.role_policy.resolve(identity.as_ref()).await;
    Ok(ApiResponse::success(resolution))
}

pub async fn check_access(
    identity: Option<Identity>,
    state: Data<AppState>,
    requirement: Json<AccessRequirement>,
) -> Result<HttpResponse> {
    let resolution = state.role_policy.resolve(identity.as_ref()).await;
    let decision = AccessGate::evaluate(&requirement, &AccessState::Ready(resolution));

    Ok(ApiResponse::success(GateResponse::from(decision)))
}
