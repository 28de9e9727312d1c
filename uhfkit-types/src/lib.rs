//! Type definitions for uhfkit

pub mod error;
pub mod inventory;
pub mod reading;
pub mod work_mode;

pub use error::{Error, Result};
pub use inventory::InventoryReport;
pub use reading::{TagReading, TidReading};
pub use work_mode::WorkMode;
