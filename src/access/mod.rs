pub mod context;
pub mod gate;
pub mod policy;
pub mod role;

pub use context::AccessContext;
pub use gate::{
    AccessGate, AccessRequirement, AccessState, DenyView, DenyViewBody, GateDecision,
    GateResponse,
};
pub use policy::{NoPaidSubscriptions, RolePolicy, SubscriptionCheck, TeamSubscriptionCheck};
pub use role::{PermissionSet, Role, RoleResolution};
