use gordon_config::cli::commands::{CliArgs, Commands};
use gordon_config::cli::handlers::{handle_generate, handle_normalize};
use gordon_config::util::logging::{init_logging, LoggingConfig};
use gordon_config::{NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::resolve(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Generate(generate_args) => {
            handle_generate(generate_args, args.quiet, args.verbose).await
        }
        Commands::Normalize(normalize_args) => handle_normalize(normalize_args),
    };

    process::exit(exit_code);
}
