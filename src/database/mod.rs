//! Database module
//!
//! This module handles database connections, the storage abstraction and the
//! per-event unit of work.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod repositories;
pub mod storage;

// Re-export commonly used database components
pub use connection::{DatabasePool, create_pool, health_check, pool_options, run_migrations};
pub use memory::MemoryStorage;
pub use postgres::PgStorage;
pub use repositories::UserRepository;
pub use storage::{Storage, UnitOfWork, Transactional, with_transaction};
