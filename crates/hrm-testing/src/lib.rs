//! Test utilities for HRM services.
//!
//! Provides `MockAuth` for injecting gateway identity headers.
//! Dev-dependency only; never linked into a service binary.

pub mod auth;
