use serde::{Deserialize, Serialize};

use crate::access::role::{PermissionSet, Role, RoleResolution};

/// Capabilities a protected view or endpoint declares it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessRequirement {
    pub require_dashboard: bool,
    pub require_equipment: bool,
    pub require_reports: bool,
    pub require_admin: bool,
}

impl AccessRequirement {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn dashboard(mut self) -> Self {
        self.require_dashboard = true;
        self
    }

    pub fn equipment(mut self) -> Self {
        self.require_equipment = true;
        self
    }

    pub fn reports(mut self) -> Self {
        self.require_reports = true;
        self
    }

    pub fn admin(mut self) -> Self {
        self.require_admin = true;
        self
    }

    pub fn is_satisfied_by(&self, permissions: &PermissionSet) -> bool {
        (!self.require_dashboard || permissions.can_access_dashboard)
            && (!self.require_equipment || permissions.can_manage_equipment)
            && (!self.require_reports || permissions.can_view_reports)
            && (!self.require_admin || permissions.can_access_admin)
    }
}

/// What the gate knows about the current caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Loading,
    Ready(RoleResolution),
}

/// Shown instead of protected content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DenyView {
    /// Admin-only content. Offers a way back and nothing else.
    #[serde(rename_all = "camelCase")]
    Restricted { current_plan: Role },
    /// Paid content. Summarises the current plan and offers an upgrade.
    #[serde(rename_all = "camelCase")]
    Upgrade { current_plan: Role },
}

impl DenyView {
    pub fn current_plan(&self) -> Role {
        match self {
            DenyView::Restricted { current_plan } | DenyView::Upgrade { current_plan } => {
                *current_plan
            }
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DenyView::Restricted { .. } => "Admin Access Required",
            DenyView::Upgrade { .. } => "Upgrade to Pro",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DenyView::Restricted { .. } => "Only administrators can access this feature.",
            DenyView::Upgrade { .. } => "This feature is available to Pro users only.",
        }
    }

    pub fn plan_label(&self) -> String {
        format!("Current Plan: {}", self.current_plan())
    }

    // TODO: flip once checkout is wired to a payment provider.
    pub fn upgrade_available(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Loading,
    Render,
    Deny(DenyView),
}

pub struct AccessGate;

impl AccessGate {
    pub fn evaluate(requirement: &AccessRequirement, state: &AccessState) -> GateDecision {
        let resolution = match state {
            AccessState::Loading => return GateDecision::Loading,
            AccessState::Ready(resolution) => resolution,
        };

        if requirement.is_satisfied_by(&resolution.permissions) {
            return GateDecision::Render;
        }

        let current_plan = resolution.role;
        if requirement.require_admin {
            GateDecision::Deny(DenyView::Restricted { current_plan })
        } else {
            GateDecision::Deny(DenyView::Upgrade { current_plan })
        }
    }
}

/// Wire form of a gate decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResponse {
    pub decision: String,
    pub view: Option<DenyViewBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenyViewBody {
    #[serde(flatten)]
    pub view: DenyView,
    pub title: String,
    pub message: String,
    pub plan_label: String,
    pub upgrade_available: bool,
}

impl From<DenyView> for DenyViewBody {
    fn from(view: DenyView) -> Self {
        Self {
            view,
            title: view.title().to_string(),
            message: view.message().to_string(),
            plan_label: view.plan_label(),
            upgrade_available: view.upgrade_available(),
        }
    }
}

impl From<GateDecision> for GateResponse {
    fn from(decision: GateDecision) -> Self {
        match decision {
            GateDecision::Loading => Self {
                decision: "loading".to_string(),
                view: None,
            },
            GateDecision::Render => Self {
                decision: "render".to_string(),
                view: None,
            },
            GateDecision::Deny(view) => Self {
                decision: "deny".to_string(),
                view: Some(view.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ready(role: Role) -> AccessState {
        AccessState::Ready(RoleResolution::for_role(role))
    }

    const ALL_ROLES: [Role; 3] = [Role::Free, Role::Paid, Role::Superadmin];

    fn all_requirements() -> Vec<AccessRequirement> {
        let mut requirements = Vec::new();
        for bits in 0u8..16 {
            requirements.push(AccessRequirement {
                require_dashboard: bits & 1 != 0,
                require_equipment: bits & 2 != 0,
                require_reports: bits & 4 != 0,
                require_admin: bits & 8 != 0,
            });
        }
        requirements
    }

    #[test]
    fn loading_suspends_both_content_and_deny_view() {
        for requirement in all_requirements() {
            assert_eq!(
                AccessGate::evaluate(&requirement, &AccessState::Loading),
                GateDecision::Loading
            );
        }
    }

    #[test]
    fn no_requirements_always_render() {
        for role in ALL_ROLES {
            assert_eq!(
                AccessGate::evaluate(&AccessRequirement::none(), &ready(role)),
                GateDecision::Render
            );
        }
    }

    #[test]
    fn renders_iff_every_declared_flag_is_granted() {
        for role in ALL_ROLES {
            let permissions = PermissionSet::for_role(role);
            for requirement in all_requirements() {
                let expected = (!requirement.require_dashboard || permissions.can_access_dashboard)
                    && (!requirement.require_equipment || permissions.can_manage_equipment)
                    && (!requirement.require_reports || permissions.can_view_reports)
                    && (!requirement.require_admin || permissions.can_access_admin);

                let decision = AccessGate::evaluate(&requirement, &ready(role));
                assert_eq!(decision == GateDecision::Render, expected, "{:?} {:?}", role, requirement);
            }
        }
    }

    #[test]
    fn admin_requirement_always_takes_restricted_branch() {
        for role in [Role::Free, Role::Paid] {
            for requirement in all_requirements().into_iter().filter(|r| r.require_admin) {
                assert_eq!(
                    AccessGate::evaluate(&requirement, &ready(role)),
                    GateDecision::Deny(DenyView::Restricted { current_plan: role })
                );
            }
        }
    }

    #[test]
    fn free_user_on_dashboard_sees_upgrade_with_plan() {
        let decision = AccessGate::evaluate(&AccessRequirement::none().dashboard(), &ready(Role::Free));

        let GateDecision::Deny(view) = decision else {
            panic!("expected deny, got {:?}", decision);
        };
        assert_eq!(view, DenyView::Upgrade { current_plan: Role::Free });
        assert_eq!(view.plan_label(), "Current Plan: free");
        assert_eq!(view.title(), "Upgrade to Pro");
        assert!(!view.upgrade_available());
    }

    #[test]
    fn deny_response_carries_view_details() {
        let response: GateResponse =
            GateDecision::Deny(DenyView::Restricted { current_plan: Role::Paid }).into();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["decision"], "deny");
        assert_eq!(json["view"]["kind"], "restricted");
        assert_eq!(json["view"]["currentPlan"], "paid");
        assert_eq!(json["view"]["title"], "Admin Access Required");
        assert_eq!(json["view"]["planLabel"], "Current Plan: paid");
    }

    #[test]
    fn requirement_deserializes_with_missing_flags() {
        let requirement: AccessRequirement =
            serde_json::from_str(r#"{"requireAdmin": true}"#).unwrap();
        assert_eq!(requirement, AccessRequirement::none().admin());
    }
}
