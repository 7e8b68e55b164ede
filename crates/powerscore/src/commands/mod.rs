//! Command handlers, one module per subcommand.

pub mod analyze;
pub mod calculate;
pub mod config_cmd;
