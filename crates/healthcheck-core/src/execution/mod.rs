//! Execution modes for chains.
//!
//! Provides both serial and parallel execution strategies.

pub mod parallel;
pub mod serial;

pub use parallel::check_parallel;
pub use serial::check_serial;
