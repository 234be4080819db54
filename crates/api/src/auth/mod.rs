//! # Authentication Module
//!
//! Credential checks and session management for Folio. Content handlers
//! depend on [`AuthService::require_auth`] (or the `AdminSession` extractor
//! built on it) before performing any write.
//!
//! - `password`: Argon2id hashing and verification
//! - `token`: session token generation
//! - `service`: login, verification, logout, provisioning
//! - `maintenance`: expired-session purge and legacy password migration

pub mod maintenance;
pub mod password;
pub mod service;
pub mod token;

pub use password::{HashParams, PasswordHasher};
pub use service::{AuthPolicy, AuthService};
