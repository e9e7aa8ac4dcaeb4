//! Database layer - connection pool and repositories
//!
//! # Design Principles
//!
//! - One shared connection pool, handed to handlers through app state
//! - Parameterized queries only
//! - Imports run in a single transaction; dropping it rolls back

pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
