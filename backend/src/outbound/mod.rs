//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: process-local repositories for development and tests
//! - **payments**: payment processor clients
//! - **security**: bcrypt password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod payments;
pub mod persistence;
pub mod security;
