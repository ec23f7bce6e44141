pub(crate) mod macros;

pub mod equipment;
pub mod signup;
pub mod team;
pub mod user;

// Re-export all models for easy importing
pub use equipment::*;
pub use signup::*;
pub use team::*;
pub use user::*;
