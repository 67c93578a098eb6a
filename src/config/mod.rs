//! Configuration models for the scheduler process.

pub mod settings;

pub use settings::{AppConfig, CountStrategy};
