//! Capture - command line entry point

use std::sync::Arc;

use anyhow::{Context, Result};
use capture_app::{commands, AppContext, Cli, Command};
use capture_infra::{config, init_tracing, InMemoryCredentialsStore, LogFormat};
use clap::Parser;
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(LogFormat::from_env(), &cli.log_level).context("failed to initialise logging")?;

    let config = match &cli.config {
        Some(path) if std::env::var_os("CAPTURE_CLIENT_ID").is_none() => {
            config::load_from_file(Some(path.clone()))
        }
        _ => config::load(),
    }
    .context("failed to load configuration")?;

    let ctx = if cli.ephemeral {
        AppContext::with_credentials_store(config, Arc::new(InMemoryCredentialsStore::new()))
    } else {
        AppContext::new(config)
    }
    .context("failed to initialise application context")?;

    let outcome = run(&ctx, &cli.command).await;
    ctx.shutdown();
    outcome
}

async fn run(ctx: &AppContext, command: &Command) -> Result<()> {
    match command {
        Command::Analyze(args) => {
            let report = commands::analyze(ctx, args)
                .await
                .with_context(|| format!("analysis of {} failed", args.file.display()))?;
            print_json(&report)
        }
        Command::Feedback(args) => {
            let report = commands::feedback(ctx, args)
                .await
                .with_context(|| format!("feedback for {} failed", args.document_id))?;
            print_json(&report)
        }
        Command::Page(args) => {
            let report = commands::page(ctx, args)
                .await
                .with_context(|| format!("page download for {} failed", args.document_id))?;
            print_json(&report)
        }
        Command::SignOut => {
            commands::sign_out(ctx).await.context("sign out failed")?;
            print_json(&serde_json::json!({ "signedOut": true }))
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
