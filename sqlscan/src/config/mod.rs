//! Configuration for the process-wide dialect

pub mod defaults;
mod settings;

pub use settings::Settings;
