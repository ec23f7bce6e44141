use actix_web::{dev::Payload, web::Data, Error as ActixError, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::access::gate::{AccessGate, AccessRequirement, AccessState, GateDecision};
use crate::access::role::RoleResolution;
use crate::auth::Identity;
use crate::error::AppError;
use crate::AppState;

/// Authenticated caller together with their resolved role.
///
/// Extracting this requires a valid bearer token; resolution itself never
/// fails once the caller is known.
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub identity: Identity,
    pub resolution: RoleResolution,
}

impl AccessContext {
    pub fn user_id(&self) -> &str {
        &self.identity.id
    }

    pub fn is_superadmin(&self) -> bool {
        self.resolution.permissions.is_super
    }

    /// Run the gate against this caller and turn a denial into a 403 that
    /// carries the deny view.
    pub fn require(&self, requirement: AccessRequirement) -> Result<(), AppError> {
        match AccessGate::evaluate(&requirement, &AccessState::Ready(self.resolution)) {
            GateDecision::Render => Ok(()),
            GateDecision::Deny(view) => {
                log::info!(
                    "Denied {} ({}) access: {}",
                    self.identity.id,
                    self.resolution.role,
                    view.title()
                );
                Err(AppError::AccessDenied(view))
            }
            GateDecision::Loading => Err(AppError::internal_server_error_message(
                "Access state unresolved",
            )),
        }
    }
}

impl FromRequest for AccessContext {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload);
        let state = req.app_data::<Data<AppState>>().cloned();

        Box::pin(async move {
            let identity = identity.await?;
            let state = state.ok_or_else(|| {
                AppError::internal_server_error_message("Application state not configured")
            })?;

            let resolution = state.role_policy.resolve(Some(&identity)).await;
            Ok(AccessContext {
                identity,
                resolution,
            })
        })
    }
}
