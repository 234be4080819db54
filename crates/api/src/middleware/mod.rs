/// Bearer-token extraction and the admin gate for handlers
pub mod auth;
/// Mapping of domain errors to HTTP responses
pub mod error_handling;
