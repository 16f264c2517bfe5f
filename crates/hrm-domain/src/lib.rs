//! Domain types shared across all HRM services.
//!
//! Pure types with no framework dependencies: ids, roles and their
//! capabilities, the acting identity, visibility scopes and pagination.

pub mod actor;
pub mod id;
pub mod pagination;
pub mod role;
pub mod scope;
