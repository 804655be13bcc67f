mod db;
mod kube;
mod tui;

use anyhow::{bail, Context, Result};
use chanops_core::config::Config;
use chanops_core::reconcile::reconcile_owned;
use chanops_core::session::Session;
use chanops_core::throttle::UpdateThrottle;
use chrono::{Duration, Local};
use clap::Parser;
use std::path::PathBuf;
use tui::ExitIntent;

#[derive(Parser)]
#[command(
    name = "chanops",
    about = "Toggle payment-channel consume/repayment traffic via deployment env vars",
    version
)]
struct Cli {
    /// Config file (YAML); defaults apply when omitted
    #[arg(long, env = "CHANOPS_CONFIG")]
    config: Option<PathBuf>,

    /// Kubeconfig path (default: ambient client config)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Cluster namespace of the managed deployment
    #[arg(long, short = 'n')]
    namespace: Option<String>,

    /// Deployment whose container env holds the channel entries
    #[arg(long)]
    deployment: Option<String>,

    /// Container name (default: first container)
    #[arg(long)]
    container: Option<String>,

    /// MySQL connection string for channel metadata
    #[arg(long, env = "CHANOPS_DATABASE_URL")]
    database_url: Option<String>,

    /// Compute and print the new env list without writing it back
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn into_config(self) -> Result<(Config, bool)> {
        let mut config = Config::load_or_default(self.config.as_deref())
            .context("failed to load config")?;
        if self.kubeconfig.is_some() {
            config.kubeconfig = self.kubeconfig;
        }
        if let Some(namespace) = self.namespace {
            config.namespace = namespace;
        }
        if let Some(deployment) = self.deployment {
            config.deployment = deployment;
        }
        if let Some(container) = self.container {
            config.container = container;
        }
        if let Some(database_url) = self.database_url {
            config.database_url = database_url;
        }
        config.validate().context("invalid config")?;
        Ok((config, self.dry_run))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let (config, dry_run) = cli.into_config()?;
    if config.database_url.is_empty() {
        bail!("no database URL: pass --database-url or set CHANOPS_DATABASE_URL");
    }

    let pool = db::connect(&config.database_url).await?;
    let metas = db::fetch_channel_meta(&pool).await?;
    if metas.is_empty() {
        bail!("channel metadata table is empty; nothing to manage");
    }
    tracing::debug!(channels = metas.len(), "loaded channel metadata");

    let mut gateway = kube::DeploymentGateway::connect(
        config.kubeconfig.as_deref(),
        &config.namespace,
        &config.deployment,
        &config.container,
    )
    .await?;

    let live = gateway.env_entries()?;
    let mut session = Session::seed(metas, &live);

    let intent = tui::run(&mut session)?;
    if intent == ExitIntent::Discard {
        tracing::debug!("discarded session");
        return Ok(());
    }

    // The throttle stamp is consumed up front; a failed write-back does
    // not refund the window.
    let throttle = UpdateThrottle::new(
        &config.stamp_path,
        Duration::minutes(config.cooldown_minutes),
    );
    throttle.check_and_record(Local::now().naive_local())?;

    gateway.refresh().await?;
    let live = gateway.env_entries()?;
    let new_entries = reconcile_owned(&live, session.take_pending());

    if dry_run {
        println!("dry run: would set {} env entries:", new_entries.len());
        for entry in &new_entries {
            println!("  {}={}", entry.name, entry.value);
        }
        return Ok(());
    }

    gateway.replace_env(&new_entries).await?;
    println!(
        "updated {}/{} with {} env entries",
        config.namespace,
        config.deployment,
        new_entries.len()
    );
    Ok(())
}
