//! Configuration module for Shelf-Harvest
//!
//! The configuration is assembled once from CLI flags at startup and passed
//! into the harvester; there is no runtime reconfiguration.

mod types;
mod validation;

// Re-export types
pub use types::HarvestConfig;

// Re-export validation
pub use validation::validate;
