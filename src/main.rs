mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crmpilot_core::{AppConfig, RunContext};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        eprintln!("config file '{}' not found, using defaults", cli.config);
        include_str!("../config/default.toml").to_string()
    });
    let mut config: AppConfig = toml::from_str(&config_str)?;
    apply_env_overrides(&mut config);

    let ctx = RunContext::new(&config.artifacts.report_dir);

    // Console output plus the in-memory buffer the per-test step logs are
    // drained from.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(ctx.log_buffer.clone()),
        )
        .init();

    // One token covers the whole run; Ctrl-C aborts any in-flight poll.
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling run");
            interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Run { module, filter } => {
            let failed = commands::run::run(
                &config,
                &ctx,
                module.as_deref(),
                filter.as_deref(),
                &cancel,
            )
            .await?;
            if failed > 0 {
                std::process::exit(1);
            }
        }
        Commands::List => commands::list::list(),
        Commands::CheckMail {
            recipient,
            subject_keyword,
        } => {
            commands::check_mail::check_mail(&config, recipient, subject_keyword, &cancel).await?;
        }
    }

    Ok(())
}

/// Credentials and deployment-specific values come from the environment, not
/// the config file.
fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(v) = std::env::var("CRM_BASE_URL") {
        config.sut.base_url = v;
    }
    if let Ok(v) = std::env::var("HEADLESS") {
        config.browser.headless = !matches!(v.as_str(), "0" | "false");
    }
    if let Ok(v) = std::env::var("IMAP_SERVER") {
        config.mailbox.server = v;
    }
    if let Ok(v) = std::env::var("IMAP_FOLDER") {
        config.mailbox.folder = v;
    }
    if let Ok(v) = std::env::var("TEST_EMAIL_PREFIX") {
        config.mailbox.address_prefix = v;
    }
    if let Ok(v) = std::env::var("TEST_EMAIL_DOMAIN") {
        config.mailbox.address_domain = v;
    }
    if let Ok(v) = std::env::var("TEST_EMAIL_PASSWORD") {
        config.mailbox.password = v;
    }
}
