//! Auth types shared across HRM services.
//!
//! Credentials are verified upstream; services only read the identity the
//! gateway injects. Provides the `IdentityHeaders` extractor.

pub mod identity;
