//! Durable named counters with cycle-based automatic reset.
//!
//! - [`cycle`]: next calendar occurrence of a cycle, and the elapsed-interval
//!   reset decision
//! - [`store`]: JSON counter files with legacy bare-integer reads and a
//!   read-only permission guard around every write
//! - [`ops`]: read, reset-if-due, mutate, write back

pub mod config;
pub mod counter;
pub mod cycle;
pub mod error;
mod guard;
pub mod ops;
pub mod paths;
pub mod store;

pub use config::{ConfigError, CounterConfig};
pub use counter::Counter;
pub use error::*;
pub use ops::{execute, Operation, Outcome};
pub use store::CounterStore;
