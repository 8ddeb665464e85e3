use crate::commands::{self, GenerateOptions};
use crate::config::{ConfigUpdate, GatewayMode};
use crate::credentials::{CredentialKey, Credentials};
use crate::log_debug;
use crate::providers::Model;
use crate::types::SourceType;
use crate::ui;
use chrono::NaiveDate;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use colored::Colorize;
use std::path::PathBuf;

const LOG_FILE: &str = "release-scribe-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "release-scribe: AI-generated release notes from GitHub commit history",
    long_about = "release-scribe fetches the commits (or commits and diffs) of a GitHub repository \
    within a date range and asks an LLM to turn them into Markdown release notes.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Write debug logs to a file
    #[arg(short = 'l', long = "log", global = true)]
    pub log: bool,

    /// Log file used with --log
    #[arg(long = "log-file", global = true, value_name = "PATH")]
    pub log_file: Option<String>,

    /// Hide spinners and status lines; errors still print
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Print the version and exit
    #[arg(short = 'v', long = "version", global = true)]
    pub version: bool,
}

/// Credential flags shared by commands that talk to GitHub or a provider
#[derive(clap::Args, Clone, Debug, Default)]
pub struct CredentialArgs {
    #[arg(long, help = "GitHub access token (falls back to GITHUB_TOKEN)")]
    pub github_token: Option<String>,

    #[arg(long, help = "OpenAI API key (falls back to OPENAI_API_KEY)")]
    pub openai_key: Option<String>,

    #[arg(long, help = "Anthropic API key (falls back to ANTHROPIC_API_KEY)")]
    pub anthropic_key: Option<String>,
}

impl From<CredentialArgs> for Credentials {
    fn from(args: CredentialArgs) -> Self {
        Self {
            github_token: args.github_token,
            openai_api_key: args.openai_key,
            anthropic_api_key: args.anthropic_key,
        }
    }
}

/// Date range flags
#[derive(clap::Args, Clone, Debug)]
pub struct DateArgs {
    #[arg(long, value_parser = parse_date, help = "First day of the range (YYYY-MM-DD)")]
    pub from: Option<NaiveDate>,

    #[arg(long, value_parser = parse_date, help = "Last day of the range (YYYY-MM-DD), inclusive")]
    pub to: Option<NaiveDate>,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate release notes for a repository and date range
    #[command(
        about = "Generate release notes",
        long_about = "Generate Markdown release notes from the commits of a GitHub repository within a date range."
    )]
    Generate {
        /// Repository URL, e.g. <https://github.com/owner/repo>
        url: String,

        #[command(flatten)]
        dates: DateArgs,

        #[arg(long, value_parser = parse_source, help = "Source data: commits or diffs")]
        source: Option<SourceType>,

        #[arg(long, value_parser = parse_model, help = "Model: gpt-4o-mini or claude")]
        model: Option<Model>,

        #[arg(long, help = "Route requests through a release-scribe proxy at this URL")]
        proxy: Option<String>,

        #[command(flatten)]
        credentials: CredentialArgs,

        #[arg(short, long, help = "Print the raw Markdown instead of the styled view")]
        print: bool,

        #[arg(short, long, help = "Copy the Markdown to the clipboard")]
        copy: bool,

        #[arg(short, long, help = "Write the Markdown to a file")]
        output: Option<PathBuf>,
    },

    /// List the commits in a date range
    #[command(about = "List commits in a date range")]
    Commits {
        /// Repository URL
        url: String,

        #[command(flatten)]
        dates: DateArgs,

        #[arg(long, help = "GitHub access token (falls back to GITHUB_TOKEN)")]
        github_token: Option<String>,
    },

    /// Check whether a repository is public or private
    #[command(about = "Check repository visibility")]
    Visibility {
        /// Repository URL
        url: String,

        #[arg(long, help = "GitHub access token (falls back to GITHUB_TOKEN)")]
        github_token: Option<String>,
    },

    /// Run the HTTP proxy endpoint
    #[command(
        about = "Run the proxy endpoint",
        long_about = "Serve the GitHub and generation operations over HTTP so that API keys stay on the server."
    )]
    Serve {
        #[arg(long, help = "Address to listen on")]
        host: Option<String>,

        #[arg(short, long, help = "Port to listen on")]
        port: Option<u16>,
    },

    /// Manage stored credentials
    #[command(about = "Manage stored credentials")]
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },

    /// Configure release-scribe settings
    #[command(about = "Configure release-scribe settings")]
    Config {
        #[arg(long, value_parser = parse_mode, help = "Gateway mode: direct or proxy")]
        mode: Option<GatewayMode>,

        #[arg(long, help = "Proxy endpoint URL used in proxy mode")]
        proxy_url: Option<String>,

        #[arg(long, help = "Maximum diff requests in flight")]
        concurrency: Option<usize>,

        #[arg(long, value_parser = parse_model, help = "Default model")]
        model: Option<Model>,

        #[arg(long, value_parser = parse_source, help = "Default source type")]
        source: Option<SourceType>,

        #[arg(long, help = "Log HTTP-level details when logging is on")]
        verbose_logging: Option<bool>,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum CredentialsAction {
    /// Store a credential
    Set {
        #[arg(value_parser = parse_credential_key)]
        key: CredentialKey,
        value: String,
    },
    /// Remove a stored credential
    Clear {
        #[arg(value_parser = parse_credential_key)]
        key: CredentialKey,
    },
    /// Show which credentials are available (masked)
    Show,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{value}'. Expected YYYY-MM-DD"))
}

fn parse_source(value: &str) -> Result<SourceType, String> {
    value.parse().map_err(|e: crate::types::ParseSourceTypeError| e.to_string())
}

fn parse_model(value: &str) -> Result<Model, String> {
    value.parse().map_err(|e: crate::providers::ParseModelError| e.to_string())
}

fn parse_mode(value: &str) -> Result<GatewayMode, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_credential_key(value: &str) -> Result<CredentialKey, String> {
    value
        .parse()
        .map_err(|e: crate::credentials::CredentialKeyError| e.to_string())
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Help footer listing the supported models
fn get_dynamic_help() -> String {
    let models = Model::ALL
        .iter()
        .map(|m| format!("{} ({})", m.name().bold(), m.provider_name()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable models: {models}")
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log {
        crate::logger::enable_logging();
        crate::logger::set_log_to_stdout(false);
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;

        if let Ok(config) = crate::config::Config::load()
            && config.verbose_logging
        {
            crate::logger::set_verbose_logging(true);
            log_debug!("Verbose logging enabled - will show HTTP requests and external library logs");
        }
    } else {
        crate::logger::disable_logging();
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command).await
    } else {
        let _ = Cli::parse_from(["release-scribe", "--help"]);
        Ok(())
    }
}

/// Handle the command based on parsed arguments
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Generate {
            url,
            dates,
            source,
            model,
            proxy,
            credentials,
            print,
            copy,
            output,
        } => {
            commands::handle_generate_command(GenerateOptions {
                url,
                start_date: dates.from,
                end_date: dates.to,
                source,
                model,
                proxy,
                credentials: credentials.into(),
                print,
                copy,
                output,
            })
            .await
        }
        Commands::Commits {
            url,
            dates,
            github_token,
        } => commands::handle_commits_command(&url, dates.from, dates.to, github_token).await,
        Commands::Visibility { url, github_token } => {
            commands::handle_visibility_command(&url, github_token).await
        }
        Commands::Serve { host, port } => commands::handle_serve_command(host, port).await,
        Commands::Credentials { action } => commands::handle_credentials_command(action),
        Commands::Config {
            mode,
            proxy_url,
            concurrency,
            model,
            source,
            verbose_logging,
        } => commands::handle_config_command(ConfigUpdate {
            mode,
            proxy_url,
            max_concurrent_diffs: concurrency,
            default_model: model,
            default_source: source,
            verbose_logging,
        }),
    }
}
