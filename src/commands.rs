use crate::cli::CredentialsAction;
use crate::config::{Config, ConfigUpdate, GatewayMode};
use crate::credentials::{CredentialKey, CredentialStore, Credentials, mask};
use crate::error::ReleaseNotesError;
use crate::github::{DateWindow, DirectGateway, ProxiedGateway, RepositoryGateway};
use crate::log_debug;
use crate::logger;
use crate::pipeline::{ReleaseNotesPipeline, Submission};
use crate::providers::Model;
use crate::repository;
use crate::server::{self, AppState};
use crate::types::SourceType;
use crate::ui::{self, rgb};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use colored::Colorize;
use std::path::PathBuf;

/// Inputs for the `generate` command
#[derive(Debug)]
pub struct GenerateOptions {
    pub url: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub source: Option<SourceType>,
    pub model: Option<Model>,
    pub proxy: Option<String>,
    pub credentials: Credentials,
    pub print: bool,
    pub copy: bool,
    pub output: Option<PathBuf>,
}

/// Layer credentials: flags, then the environment, then the store
pub fn resolve_credentials(flags: Credentials) -> Result<Credentials> {
    let stored = CredentialStore::default_location()?.load()?;
    Ok(flags.prefer(Credentials::from_env()).prefer(stored))
}

fn parse_repository(url: &str) -> Result<repository::RepositoryReference> {
    repository::parse(url).ok_or_else(|| anyhow!("Invalid GitHub repository URL"))
}

fn direct_gateway(config: &Config) -> DirectGateway {
    DirectGateway::new(reqwest::Client::new())
        .with_api_url(&config.gateway.github_api_url)
        .with_max_concurrent_diffs(config.gateway.max_concurrent_diffs)
}

/// Print a failed submission; token-limit failures get their own heading
fn report_failure(error: &ReleaseNotesError) {
    if error.is_token_limit() {
        let (r, g, b) = rgb::ERROR_RED;
        eprintln!("{}", "✦ Input too long for the model".truecolor(r, g, b).bold());
    }
    if matches!(error, ReleaseNotesError::PrivateRepoAuthRequired) {
        ui::print_warning(
            "Pass --github-token or run `release-scribe credentials set GITHUB_TOKEN <token>`.",
        );
    }
}

pub async fn handle_generate_command(options: GenerateOptions) -> Result<()> {
    log_debug!(
        "Starting 'generate' command for {} ({:?} to {:?}), source: {:?}, model: {:?}",
        options.url,
        options.start_date,
        options.end_date,
        options.source,
        options.model
    );

    let mut config = Config::load()?;
    if let Some(proxy_url) = options.proxy {
        config.gateway.mode = GatewayMode::Proxy;
        config.gateway.proxy_url = proxy_url;
    }

    let credentials = resolve_credentials(options.credentials)?;
    let submission = Submission {
        repository_url: options.url,
        start_date: options.start_date,
        end_date: options.end_date,
        source_type: options.source.unwrap_or(config.default_source),
        model: options.model.unwrap_or(config.default_model),
    };

    let pipeline = ReleaseNotesPipeline::from_config(&config);
    let spinner = ui::create_spinner("Preparing...");
    let result = pipeline
        .run_with_progress(&submission, &credentials, |stage| {
            spinner.set_message(stage.describe());
        })
        .await;
    spinner.finish_and_clear();

    let notes = match result {
        Ok(notes) => notes,
        Err(error) => {
            report_failure(&error);
            return Err(error.into());
        }
    };

    if let Some(path) = &options.output {
        notes.write_to(path)?;
        ui::print_success(&format!("Release notes written to {}", path.display()));
    }

    if options.copy {
        match notes.copy_to_clipboard() {
            Ok(()) => ui::print_success("Release notes copied to clipboard"),
            Err(e) => ui::print_warning(&format!("Could not copy to clipboard: {e}")),
        }
    }

    if options.print {
        println!("{}", notes.raw_content());
    } else {
        println!("{}", notes.format());
    }

    Ok(())
}

/// List the commit records in a window (always talks to GitHub directly)
pub async fn handle_commits_command(
    url: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    github_token: Option<String>,
) -> Result<()> {
    let (Some(start), Some(end)) = (start_date, end_date) else {
        return Err(anyhow!("Please select both start and end dates"));
    };

    let repo = parse_repository(url)?;
    let window = DateWindow::from_dates(start, end)?;
    let config = Config::load()?;
    let credentials = resolve_credentials(Credentials {
        github_token,
        ..Credentials::default()
    })?;

    let spinner = ui::create_spinner(&format!("Fetching commits for {repo}..."));
    let commits = direct_gateway(&config)
        .list_commits(&repo, &window, &credentials)
        .await;
    spinner.finish_and_clear();
    let commits = commits?;

    if commits.is_empty() {
        ui::print_warning("No commits found in the selected date range");
        return Ok(());
    }

    let (yr, yg, yb) = rgb::ELECTRIC_YELLOW;
    let (dr, dg, db) = rgb::DIM_WHITE;
    for commit in &commits {
        println!(
            "{} {} {} {}",
            commit.short_sha().truecolor(yr, yg, yb),
            commit.date.truecolor(dr, dg, db),
            format!("<{}>", commit.author).truecolor(dr, dg, db),
            commit.subject()
        );
    }
    ui::print_newline();
    ui::print_info(&format!("{} commits in {}", commits.len(), repo));

    Ok(())
}

pub async fn handle_visibility_command(url: &str, github_token: Option<String>) -> Result<()> {
    let repo = parse_repository(url)?;
    let config = Config::load()?;
    let credentials = resolve_credentials(Credentials {
        github_token,
        ..Credentials::default()
    })?;

    let visibility = match config.gateway.mode {
        GatewayMode::Direct => direct_gateway(&config).check_visibility(&repo, &credentials).await,
        GatewayMode::Proxy => {
            ProxiedGateway::new(reqwest::Client::new(), &config.gateway.proxy_url)
                .check_visibility(&repo, &credentials)
                .await
        }
    };

    ui::print_labeled("Repository", &repo.html_url());
    ui::print_labeled(
        "Visibility",
        if visibility.is_private { "private" } else { "public" },
    );
    if let Some(error) = visibility.error {
        ui::print_warning(&error);
    }

    Ok(())
}

pub async fn handle_serve_command(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    logger::ensure_console_logging();

    let addr = config.server.socket_addr()?;
    let state = AppState::from_config(&config);

    ui::print_info(&format!("Proxy endpoint listening on http://{addr}"));
    for &key in CredentialKey::ALL {
        if state.server_credentials.get(key).is_some() {
            ui::print_labeled("Using server credential", key.name());
        }
    }

    server::serve(addr, state).await
}

pub fn handle_credentials_command(action: CredentialsAction) -> Result<()> {
    let store = CredentialStore::default_location()?;

    match action {
        CredentialsAction::Set { key, value } => {
            store.set(key, &value)?;
            ui::print_success(&format!("{key} saved to {}", store.path().display()));
        }
        CredentialsAction::Clear { key } => {
            store.clear(key)?;
            ui::print_success(&format!("{key} removed"));
        }
        CredentialsAction::Show => {
            let stored = store.load()?;
            let env = Credentials::from_env();

            print_section_header("CREDENTIALS");
            for &key in CredentialKey::ALL {
                let (value, source) = match (env.get(key), stored.get(key)) {
                    (Some(value), _) => (mask(value), "env"),
                    (None, Some(value)) => (mask(value), "store"),
                    (None, None) => ("(not set)".to_string(), ""),
                };
                let shown = format!("{value} {source}");
                print_config_row(key.name(), shown.trim_end(), rgb::NEON_CYAN, false);
            }
        }
    }

    Ok(())
}

pub fn handle_config_command(update: ConfigUpdate) -> Result<()> {
    log_debug!("Starting 'config' command with {:?}", update);

    let mut config = Config::load()?;

    if !update.is_empty() {
        config.update(update);
        config.save().context("Failed to save configuration")?;
        ui::print_success("Configuration updated successfully.");
        ui::print_newline();
    }

    print_configuration(&config);
    Ok(())
}

fn print_configuration(config: &Config) {
    let (pr, pg, pb) = rgb::ELECTRIC_PURPLE;
    let (cr, cg, cb) = rgb::NEON_CYAN;
    let (sr, sg, sb) = rgb::DIM_SEPARATOR;

    println!();
    println!(
        "{}  {}  {}",
        "━━━".truecolor(pr, pg, pb),
        "RELEASE-SCRIBE CONFIGURATION".truecolor(cr, cg, cb).bold(),
        "━━━".truecolor(pr, pg, pb)
    );
    println!();

    print_section_header("GENERATION");
    print_config_row("Model", config.default_model.name(), rgb::NEON_CYAN, true);
    print_config_row("Source", config.default_source.name(), rgb::ELECTRIC_YELLOW, false);
    print_config_row(
        "Verbose log",
        if config.verbose_logging { "enabled" } else { "disabled" },
        if config.verbose_logging {
            rgb::SUCCESS_GREEN
        } else {
            rgb::DIM_WHITE
        },
        false,
    );

    println!();
    print_section_header("GATEWAY");
    print_config_row("Mode", config.gateway.mode.name(), rgb::NEON_CYAN, true);
    print_config_row("Proxy URL", &config.gateway.proxy_url, rgb::DIM_WHITE, false);
    print_config_row("GitHub API", &config.gateway.github_api_url, rgb::DIM_WHITE, false);
    print_config_row(
        "Concurrency",
        &config.gateway.max_concurrent_diffs.to_string(),
        rgb::CORAL,
        false,
    );

    println!();
    print_section_header("PROVIDERS");
    print_config_row("OpenAI", &config.providers.openai_api_url, rgb::DIM_WHITE, false);
    print_config_row("Anthropic", &config.providers.anthropic_api_url, rgb::DIM_WHITE, false);

    println!();
    print_section_header("SERVER");
    print_config_row(
        "Listen",
        &format!("{}:{}", config.server.host, config.server.port),
        rgb::DIM_WHITE,
        false,
    );

    println!();
    println!("{}", "─".repeat(40).truecolor(sr, sg, sb));
    println!();
}

fn print_section_header(name: &str) {
    let (pr, pg, pb) = rgb::ELECTRIC_PURPLE;
    let (sr, sg, sb) = rgb::DIM_SEPARATOR;
    println!(
        "{} {} {}",
        "─".truecolor(pr, pg, pb),
        name.truecolor(pr, pg, pb).bold(),
        "─".repeat(30 - name.len().min(28)).truecolor(sr, sg, sb)
    );
}

fn print_config_row(label: &str, value: &str, value_color: (u8, u8, u8), highlight: bool) {
    let (dr, dg, db) = rgb::DIM_WHITE;
    let label_styled = format!("{label:>17}").truecolor(dr, dg, db);

    let value_styled = if highlight {
        value
            .truecolor(value_color.0, value_color.1, value_color.2)
            .bold()
    } else {
        value.truecolor(value_color.0, value_color.1, value_color.2)
    };

    println!("{label_styled}  {value_styled}");
}
