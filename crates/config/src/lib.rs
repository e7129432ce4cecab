// Configuration loading

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{HttpSettings, MergeSettings, PathSettings, Settings, SourceSettings};
