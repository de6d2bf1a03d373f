pub mod cli;
pub mod config;
pub mod core;
pub mod errors;

// Re-exports
pub use crate::core::{select_host, HostRecord, Inventory, Metric, Selection, VsphereSession};
pub use errors::{SamplingError, SelectorError, SelectorResult};
