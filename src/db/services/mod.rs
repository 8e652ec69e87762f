//! Data access for the ranking table. Handlers call these functions instead of
//! building queries themselves; everything is re-exported under
//! `crate::db::services::`.

pub mod record_service;

pub use record_service::*;
