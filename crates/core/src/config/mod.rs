//! Configuration loading and schema definitions
//!
//! Settings for the preprocessor, upload limits and logging, read from
//! `imghost.toml`.

mod loader;
mod schema;

pub use loader::{user_config_dir, Config, OUTPUT_FORMATS};
pub use schema::*;
