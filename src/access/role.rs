use serde::{Deserialize, Serialize};

/// Coarse access tier derived from an identity. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Free,
    Paid,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Free => "free",
            Role::Paid => "paid",
            Role::Superadmin => "superadmin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Role::Free),
            "paid" => Ok(Role::Paid),
            "superadmin" => Ok(Role::Superadmin),
            _ => Err(format!("Invalid Role: {}", s)),
        }
    }
}

/// Capability flags consumed by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub can_access_dashboard: bool,
    pub can_manage_equipment: bool,
    pub can_view_reports: bool,
    pub can_access_admin: bool,
    pub is_super: bool,
}

impl PermissionSet {
    /// All flags false. What unauthenticated callers and free users get.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Superadmin => Self {
                can_access_dashboard: true,
                can_manage_equipment: true,
                can_view_reports: true,
                can_access_admin: true,
                is_super: true,
            },
            Role::Paid => Self {
                can_access_dashboard: true,
                can_manage_equipment: true,
                can_view_reports: true,
                can_access_admin: false,
                is_super: false,
            },
            Role::Free => Self::none(),
        }
    }
}

/// Output of the role resolver: the role and the permissions it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResolution {
    pub role: Role,
    pub permissions: PermissionSet,
}

impl RoleResolution {
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            permissions: PermissionSet::for_role(role),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::for_role(Role::Free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_table_matches_roles() {
        let free = PermissionSet::for_role(Role::Free);
        assert_eq!(free, PermissionSet::none());

        let paid = PermissionSet::for_role(Role::Paid);
        assert!(paid.can_access_dashboard);
        assert!(paid.can_manage_equipment);
        assert!(paid.can_view_reports);
        assert!(!paid.can_access_admin);
        assert!(!paid.is_super);

        let superadmin = PermissionSet::for_role(Role::Superadmin);
        assert!(superadmin.can_access_dashboard);
        assert!(superadmin.can_manage_equipment);
        assert!(superadmin.can_view_reports);
        assert!(superadmin.can_access_admin);
        assert!(superadmin.is_super);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Superadmin).unwrap(), "\"superadmin\"");
        assert_eq!("Paid".parse::<Role>().unwrap(), Role::Paid);
        assert!("gold".parse::<Role>().is_err());
    }

    #[test]
    fn permissions_serialize_camel_case() {
        let json = serde_json::to_value(PermissionSet::for_role(Role::Paid)).unwrap();
        assert_eq!(json["canManageEquipment"], true);
        assert_eq!(json["canAccessAdmin"], false);
        assert_eq!(json["isSuper"], false);
    }
}
