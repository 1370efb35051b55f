use super::commands::{GenerateArgs, NormalizeArgs};
use crate::builder::StreamDiscovery;
use crate::config::GeneratorConfig;
use crate::error::BuildError;
use crate::normalize::normalize;
use crate::pipeline::{ConfigOrchestrator, WrittenDocuments};
use crate::progress::LoggingHandler;
use crate::provider::ProviderGateway;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

pub async fn handle_generate(args: &GenerateArgs, quiet: bool, verbose: bool) -> i32 {
    info!("Generating configuration for stack {}", args.stack);

    let default_config = GeneratorConfig::default();
    let config = GeneratorConfig {
        region: args.region.clone().or(default_config.region.clone()),
        profile: args.profile.clone().or(default_config.profile.clone()),
        ..default_config
    };
    if args.region.is_some() {
        debug!("Region overridden to: {:?}", config.region);
    }
    if args.profile.is_some() {
        debug!("Profile overridden to: {:?}", config.profile);
    }

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return 1;
    }

    let gateway: Arc<dyn ProviderGateway> = Arc::new(config.create_gateway().await);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run_generate(args, gateway, &config, quiet, verbose, &mut out).await {
        Ok(Some(written)) => {
            if !quiet {
                info!(
                    "Wrote {} and {}",
                    written.parameters.display(),
                    written.settings.display()
                );
            }
            0
        }
        Ok(None) => 0,
        Err(e) => {
            error!("Configuration generation failed: {}", e);
            1
        }
    }
}

/// Builds, writes, and optionally prints the documents for one stack.
///
/// Without an output directory the documents are written to the current
/// directory, unless they are printed instead. Returns the written paths.
pub async fn run_generate(
    args: &GenerateArgs,
    gateway: Arc<dyn ProviderGateway>,
    config: &GeneratorConfig,
    quiet: bool,
    verbose: bool,
    out: &mut impl Write,
) -> Result<Option<WrittenDocuments>, BuildError> {
    let mut orchestrator = ConfigOrchestrator::with_config(gateway, config);
    if !quiet {
        orchestrator = orchestrator.with_progress(Arc::new(LoggingHandler));
    }
    if !verbose {
        orchestrator.silent();
    }

    if let Some(template) = &args.template {
        orchestrator.add_setting_template(template);
    }

    let discovery = StreamDiscovery {
        prefix: args.stream_prefix.clone(),
        suffix: args.stream_suffix.clone(),
        table_set_key: args.table_set_key.clone(),
    };
    if discovery.is_configured() {
        debug!("Stream discovery enabled: {:?}", discovery);
        orchestrator.add_parameters_customizer(discovery);
    }

    orchestrator.build(&args.stack).await?;
    let output_dir = match (&args.output_dir, args.print) {
        (Some(dir), _) => Some(dir.clone()),
        (None, false) => Some(PathBuf::from(".")),
        (None, true) => None,
    };
    let written = output_dir
        .map(|dir| orchestrator.write(&args.stage, &dir))
        .transpose()?;

    if args.print {
        orchestrator.print_config(out, args.format.into())?;
    }

    Ok(written)
}

pub fn handle_normalize(args: &NormalizeArgs) -> i32 {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match write_normalized(&args.names, &mut out) {
        Ok(()) => 0,
        Err(e) => {
            error!("Failed to write output: {}", e);
            1
        }
    }
}

fn write_normalized(names: &[String], out: &mut impl Write) -> io::Result<()> {
    for name in names {
        writeln!(out, "{}", normalize(name))?;
    }
    Ok(())
}
