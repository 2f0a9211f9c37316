//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use orderbridge_core::{StageOutcome, run_merge, run_transform};
use orderbridge_shared::{
    AppConfig, MergeConfig, S3Event, TransformConfig, config_file_path, init_config, load_config,
    load_config_from,
};
use orderbridge_storage::init_blob_store;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// orderbridge: move ERP orders into the CRM API examples.
#[derive(Parser)]
#[command(
    name = "orderbridge",
    version,
    about = "Transform ERP order batches and merge them into the CRM API document.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.orderbridge/orderbridge.toml).
    #[arg(long, global = true, env = "ORDERBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Transform the raw ERP batch and write the envelope to the blob store.
    Transform {
        /// Raw order batch (overrides `sources.erp_data`).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Destination bucket (overrides config and env).
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Merge a stored envelope into the CRM template.
    Merge {
        /// Object-created event JSON naming the envelope.
        #[arg(long, conflicts_with_all = ["bucket", "key"])]
        event: Option<PathBuf>,

        /// Bucket holding the envelope.
        #[arg(long, requires = "key")]
        bucket: Option<String>,

        /// Envelope object key.
        #[arg(long, requires = "bucket")]
        key: Option<String>,

        /// CRM template (overrides `sources.crm_template`).
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "orderbridge=info",
        1 => "orderbridge=debug",
        _ => "orderbridge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();

    match cli.command {
        Command::Transform { input, bucket } => {
            let config = resolve_config(config_path.as_deref())?;
            cmd_transform(&config, input, bucket).await
        }
        Command::Merge {
            event,
            bucket,
            key,
            template,
        } => {
            let config = resolve_config(config_path.as_deref())?;
            let event = match (event, bucket, key) {
                (Some(path), _, _) => read_event(&path)?,
                (None, Some(bucket), Some(key)) => S3Event::single(bucket, key),
                _ => return Err(eyre!("merge needs either --event or --bucket with --key")),
            };
            cmd_merge(&config, &event, template).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path.as_deref()).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

fn read_event(path: &Path) -> Result<S3Event> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre!("cannot read event '{}': {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| eyre!("invalid event '{}': {e}", path.display()))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_transform(
    config: &AppConfig,
    input: Option<PathBuf>,
    bucket: Option<String>,
) -> Result<()> {
    let mut transform = TransformConfig::from(config);
    if let Some(input) = input {
        transform.erp_data = input;
    }
    if let Some(bucket) = bucket {
        transform.bucket = bucket;
    }

    info!(
        source = %transform.erp_data.display(),
        bucket = %transform.bucket,
        "transforming ERP batch"
    );

    let store = init_blob_store(&config.storage).await?;
    let outcome = run_transform(&transform, store.as_ref()).await;
    report(outcome)
}

async fn cmd_merge(config: &AppConfig, event: &S3Event, template: Option<PathBuf>) -> Result<()> {
    let mut merge = MergeConfig::from(config);
    if let Some(template) = template {
        merge.crm_template = template;
    }

    let store = init_blob_store(&config.storage).await?;
    let outcome = run_merge(event, &merge, store.as_ref()).await;
    report(outcome)
}

/// Print the stage response; a failed stage becomes a non-zero exit.
fn report(outcome: StageOutcome) -> Result<()> {
    let success = outcome.is_success();
    let response = outcome.into_response();
    println!("{}", serde_json::to_string_pretty(&response)?);

    if success {
        Ok(())
    } else {
        Err(eyre!("stage failed with status {}", response.status_code))
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config file created at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let shown = match path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    println!("# {}", shown.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
