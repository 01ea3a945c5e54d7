//! This module defines the command-line interface structure and handlers.

pub mod commands;

pub mod fetch_captions;
pub mod init;
pub mod inspect;
pub mod load;
pub mod monitor;
pub mod similar;
pub mod status;

// Re-export the main handler and the command enum
pub use commands::{handle_command, CliArgs, Commands};

// Re-export the Args structs for use in the main binary
pub use fetch_captions::FetchCaptionsArgs;
pub use init::InitArgs;
pub use inspect::InspectArgs;
pub use load::LoadArgs;
pub use monitor::MonitorArgs;
pub use similar::SimilarArgs;
pub use status::StatusArgs;
