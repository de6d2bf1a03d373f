/*
* ESX Host Selector Command Line Interface
* ----------------------------------------
*
* One shot, no subcommands. Meant to be called from Terraform
* (external data source or a wrapper script) right before a VM gets placed:
*
*   export TF_VAR_vsphere_server="vcenter.lab.local"
*   export TF_VAR_vsphere_user="svc_terraform@vsphere.local"
*   export TF_VAR_vsphere_password="..."
*
*   select-best-esx-host --datacenter DC1 --cluster CL-PROD
*   select-best-esx-host --datacenter DC1 --cluster CL-PROD --metric cpu --format json
*
* stdout only ever carries the answer (a bare host name, or the JSON report).
* Everything meant for humans goes to stderr, so `$(select-best-esx-host ...)`
* stays clean even with --verbose on.
*/

pub mod report;

use clap::{Parser, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;

use crate::config::Settings;
use crate::core::{select_host, Metric, VsphereSession};

#[derive(Debug, Parser)]
#[command(name = "select-best-esx-host")]
#[command(version)]
#[command(about = "Select the ESXi host with the most available resources in a vSphere cluster", long_about = None)]
pub struct Cli {
    /// vSphere datacenter name (e.g. DC1)
    #[arg(long)]
    pub datacenter: String,

    /// vSphere cluster name (e.g. CL-PROD)
    #[arg(long)]
    pub cluster: String,

    /// Selection criteria
    #[arg(long, value_enum, default_value_t = Metric::Balanced)]
    pub metric: Metric,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Fqdn)]
    pub format: OutputFormat,

    /// Print every host's figures and the final pick to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Optional TOML file with settings (TF_VAR_* env vars still win)
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Just the host name, for direct capture by automation
    #[default]
    Fqdn,
    /// The selected host and every evaluated host, pretty printed
    Json,
}

/// Sets up tracing on stderr. `--verbose` opens our own events up to debug;
/// the HTTP stack stays at warn either way.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = Targets::new()
        .with_target(env!("CARGO_CRATE_NAME"), level)
        .with_default(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .with(filter)
        .init();
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::new(cli.config.as_deref())?;
    // no network before this passes
    let credentials = settings.credentials()?;

    let session = VsphereSession::login(&credentials, &settings.vsphere_api_release).await?;

    let outcome = select_host(&session, &cli.datacenter, &cli.cluster, cli.metric).await;
    session.logout().await;
    let selection = outcome?;

    if cli.verbose {
        eprint!("{}", report::verbose_summary(&selection));
    }

    let output = report::render(&selection, cli.format)?;
    println!("{}", output);

    Ok(())
}
