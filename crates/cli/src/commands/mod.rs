pub mod config;
pub mod fetch;
pub mod render;
pub mod snapshot;
pub mod utils;

pub use config::{handle_config_command, ConfigCommands};
pub use fetch::run_fetch;
pub use snapshot::run_snapshot;
