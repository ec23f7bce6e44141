pub mod equipment;
pub mod signup;
pub mod team;
pub mod user;

// Re-export all repositories for easy importing
pub use equipment::EquipmentRepository;
pub use signup::SignupRepository;
pub use team::{DefaultTeamSpec, TeamRepository};
pub use user::UserRepository;
