use crate::access::{AccessGate, AccessRequirement, AccessState, GateDecision, RoleResolution};
use crate::client::{KitLogClient, Result};

/// Client-side access state. Starts out loading until the caller's role has
/// been fetched.
pub struct AccessView {
    client: KitLogClient,
    state: AccessState,
}

impl AccessView {
    pub fn new(client: KitLogClient) -> Self {
        Self {
            client,
            state: AccessState::Loading,
        }
    }

    pub fn state(&self) -> &AccessState {
        &self.state
    }

    pub fn resolution(&self) -> Option<RoleResolution> {
        match self.state {
            AccessState::Loading => None,
            AccessState::Ready(resolution) => Some(resolution),
        }
    }

    /// Fetch the caller's role. On failure the view stays loading.
    pub async fn load(&mut self) -> Result<RoleResolution> {
        let resolution = self.client.access().await?;
        self.state = AccessState::Ready(resolution);
        Ok(resolution)
    }

    pub fn evaluate(&self, requirement: &AccessRequirement) -> GateDecision {
        AccessGate::evaluate(requirement, &self.state)
    }
}
