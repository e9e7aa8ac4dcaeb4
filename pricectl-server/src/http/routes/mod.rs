//! Route handlers organized by resource

pub mod health;
pub mod prices;
