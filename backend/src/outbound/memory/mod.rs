//! In-memory adapters used when no database is configured and by tests.
//!
//! Each store guards its rows with a mutex and mutates single records, so
//! concurrent requests never overwrite each other's changes.

mod master_profiles;
mod orders;
mod users;

pub use master_profiles::InMemoryMasterProfileRepository;
pub use orders::InMemoryOrderRepository;
pub use users::InMemoryUserRepository;
