pub mod contract;
pub mod employee;
pub mod labor_request;
pub mod sanction;
pub mod scope;
