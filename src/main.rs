mod api;
mod commands;
mod config;
mod context;
mod error;
mod output;
mod reconcile;
mod report;
mod resources;
#[cfg(test)]
mod test_helpers;
mod traits;

use anyhow::{Context as _, Result};
use api::ReqwestClient;
use clap::{Parser, Subcommand};
use commands::{
    ApplyCommand, ConfigCommand, PlanCommand, PlanFormat, ReportFormat, SendTestEmailCommand,
    StatusCommand, TeardownCommand,
};
use config::{Config, ConfigOverrides, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mprov")]
#[command(about = "Idempotent provisioning of Mautic launch resources", long_about = None)]
#[command(version)]
struct Cli {
    /// File with MAUTIC_* settings; the process environment takes precedence
    #[arg(long, global = true, env = "MPROV_ENV_FILE", default_value = config::DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Base URL of the Mautic instance (overrides MAUTIC_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// API user (overrides MAUTIC_USER)
    #[arg(long, global = true)]
    user: Option<String>,

    /// API password (overrides MAUTIC_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Per-request timeout in seconds (overrides MAUTIC_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log HTTP calls and resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create every launch resource that does not exist yet
    Apply {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Delete the launch resources (best effort)
    Teardown {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Show which resources exist without changing anything
    Status {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Print the ordered resource plan (no credentials needed)
    Plan {
        #[arg(long, value_enum, default_value_t = PlanFormat::Text)]
        format: PlanFormat,
    },

    /// Send a test email through the configured mailer
    SendTestEmail {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Mobile number stored on the test contact
        #[arg(long)]
        mobile: Option<String>,
    },

    /// Show the resolved configuration with secrets masked
    Config,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            url: self.url.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            timeout_secs: self.timeout,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,mprov=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = context::Context::new();

    // Commands that never talk to the platform
    match &cli.command {
        Commands::Plan { format } => return PlanCommand::execute(&ctx, *format),
        Commands::Config => {
            let settings = Settings::load(&cli.env_file)?;
            return ConfigCommand::execute(&ctx, &cli.env_file, &cli.overrides(), &settings);
        }
        _ => {}
    }

    let settings = Settings::load(&cli.env_file)?;
    let config = Config::resolve(&cli.overrides(), &settings)?;
    let client = ReqwestClient::new(&config).context("Failed to set up the API client")?;
    tracing::debug!(url = %config.base_url, user = %config.user, "configuration resolved");

    match cli.command {
        Commands::Apply { format } => ApplyCommand::execute(&ctx, &client, &config, format)?,
        Commands::Teardown { yes, format } => {
            TeardownCommand::execute(&ctx, &client, yes, format)?
        }
        Commands::Status { format } => StatusCommand::execute(&ctx, &client, format)?,
        Commands::SendTestEmail { to, mobile } => {
            SendTestEmailCommand::execute(&ctx, &client, &to, mobile.as_deref())?
        }
        Commands::Plan { .. } | Commands::Config => {}
    }

    Ok(())
}
