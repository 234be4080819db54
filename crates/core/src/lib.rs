//! Domain types shared by the Folio crates.
//!
//! - `errors`: the error taxonomy every operation reports through
//! - `models`: users, sessions and the request/response shapes of the auth API
//! - `store`: the transactional credential store seam implemented by `folio-db`
//! - `clock`: time source, swappable in tests
//! - `validation`: input rules for account provisioning

pub mod clock;
pub mod errors;
pub mod models;
pub mod store;
pub mod validation;
