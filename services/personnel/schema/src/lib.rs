//! sea-orm entities for the personnel service.

pub mod contracts;
pub mod employees;
pub mod identities;
pub mod labor_requests;
pub mod sanctions;
