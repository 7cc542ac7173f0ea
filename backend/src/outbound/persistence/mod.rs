//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between internal row structs (`models.rs`,
//! `schema.rs`) and domain types; neither leaks past this module. Connections
//! come from a `bb8` pool through `diesel-async`, and every database error is
//! mapped onto the matching port error.
//!
//! # Example
//!
//! ```ignore
//! use masters_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/marketplace")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_master_profile_repository;
mod diesel_order_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_master_profile_repository::DieselMasterProfileRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
