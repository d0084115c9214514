//! Outbound adapters implementing the user repository port.
//!
//! - **persistence**: PostgreSQL via Diesel, used when a database URL is
//!   configured.
//! - **memory**: process-local store for local runs and HTTP tests.
//!
//! Adapters translate between domain types and storage representations and
//! hold no business rules.

pub mod memory;
pub mod persistence;
