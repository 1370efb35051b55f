use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Generates serverless deployment configuration from live AWS stack state
#[derive(Parser, Debug)]
#[command(
    name = "gordon-config",
    about = "Generates serverless deployment parameters and settings from live AWS stack state",
    version,
    author,
    long_about = "gordon-config reads the outputs of a deployed CloudFormation stack and the \
                  DynamoDB tables in the account, turns them into a parameters document for \
                  a deployment stage, and merges them into a settings document built from an \
                  optional YAML template."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Verbose output, including the generated documents"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate parameters and settings for a stack",
        long_about = "Describes the stack, collects its outputs as parameters, optionally \
                      records DynamoDB stream ARNs, and writes parameters/<stage>.yml and \
                      settings.yml.\n\n\
                      Examples:\n  \
                      gordon-config generate --stack app-prod --stage prod\n  \
                      gordon-config generate --stack app-prod --stage prod --template settings.tpl.yml\n  \
                      gordon-config generate --stack app-dev --stage dev --stream-prefix app-dev- --table-set-key Tables\n  \
                      gordon-config generate --stack app-dev --stage dev --print --format yaml"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Normalize identifiers into parameter keys",
        long_about = "Prints the parameter key each identifier would be stored under.\n\n\
                      Examples:\n  \
                      gordon-config normalize db.host\n  \
                      gordon-config normalize \"users table-streamArn\""
    )]
    Normalize(NormalizeArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(short = 's', long, value_name = "NAME", help = "CloudFormation stack name")]
    pub stack: String,

    #[arg(long, value_name = "STAGE", help = "Deployment stage the parameters belong to")]
    pub stage: String,

    #[arg(
        short = 't',
        long,
        value_name = "FILE",
        help = "YAML template the settings document starts from"
    )]
    pub template: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Directory the documents are written to (defaults to the current directory unless --print is given)"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_name = "REGION", help = "AWS region (overrides GORDON_CONFIG_REGION)")]
    pub region: Option<String>,

    #[arg(long, value_name = "PROFILE", help = "AWS profile (overrides GORDON_CONFIG_PROFILE)")]
    pub profile: Option<String>,

    #[arg(
        long,
        value_name = "PREFIX",
        allow_hyphen_values = true,
        help = "Only record streams of tables with this prefix"
    )]
    pub stream_prefix: Option<String>,

    #[arg(
        long,
        value_name = "SUFFIX",
        allow_hyphen_values = true,
        help = "Only record streams of tables with this suffix"
    )]
    pub stream_suffix: Option<String>,

    #[arg(
        long,
        value_name = "KEY",
        allow_hyphen_values = true,
        help = "Parameter key the matching table names are stored under"
    )]
    pub table_set_key: Option<String>,

    #[arg(long, help = "Print the generated documents to stdout")]
    pub print: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "json",
        help = "Format used by --print"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct NormalizeArgs {
    #[arg(value_name = "NAME", required = true, help = "Identifiers to normalize")]
    pub names: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
}

impl From<OutputFormatArg> for crate::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => crate::output::OutputFormat::Json,
            OutputFormatArg::Yaml => crate::output::OutputFormat::Yaml,
        }
    }
}
