/// Authentication and account endpoints
pub mod auth;
/// Liveness and version endpoints
pub mod health;
