pub mod access;
pub mod auth;
pub mod equipment;
pub mod shared;
pub mod signups;
pub mod teams;
