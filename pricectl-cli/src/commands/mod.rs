//! Command implementations for pricectl CLI

pub mod serve;

pub use serve::run_serve;
