//! Outbound adapters implementing the driven user store port.
//!
//! - **persistence**: PostgreSQL-backed repository using Diesel ORM.
//! - **memory**: in-process repository for development and tests.
//!
//! Adapters translate between domain types and storage representations and
//! contain no business logic.

pub mod memory;
pub mod persistence;
