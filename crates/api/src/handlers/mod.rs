/// Login, token verification, logout and the admin session probe
pub mod auth;
/// Account provisioning
pub mod users;
