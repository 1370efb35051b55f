pub mod commands;
pub mod handlers;

pub use commands::{CliArgs, Commands, GenerateArgs, NormalizeArgs, OutputFormatArg};
pub use handlers::{handle_generate, handle_normalize, run_generate};
