//! API handlers module

pub mod files;
pub mod health;
