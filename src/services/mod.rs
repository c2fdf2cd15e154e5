//! External service interactions
//!
//! - `inventory` - device group store behind the platform API

pub mod inventory;

pub use inventory::Inventory;
