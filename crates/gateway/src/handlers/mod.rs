//! API handlers module

pub mod health;
pub mod reports;
pub mod root;
pub mod submissions;
