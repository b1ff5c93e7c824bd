//! # gatekeeper_core
//!
//! Core RBAC domain logic for Gatekeeper: credential verification, bearer
//! token issuance/validation, principal resolution, and the authorization
//! decision engine over the role/permission graph.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
