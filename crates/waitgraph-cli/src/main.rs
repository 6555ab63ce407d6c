//! Waitgraph CLI - run allocation scenarios and report deadlocks

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use waitgraph_core::{
    AnalyticsEvent, ChannelSink, Scenario, ScenarioRunner, Simulator, SimulatorConfig,
};

/// Pending analytics events buffered before new ones are dropped.
const ANALYTICS_BUFFER: usize = 256;

#[derive(Parser)]
#[command(name = "waitgraph")]
#[command(about = "Waitgraph - resource allocation and deadlock detection simulator")]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run a scenario file (JSON, or TOML by extension)
    Run {
        /// Scenario file path
        scenario: PathBuf,

        /// Pretty-print the step outcomes
        #[arg(long)]
        pretty: bool,
    },
    /// Run the two-process circular wait and print the report
    Demo,
    /// Check configuration validity
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Run { scenario, pretty }) => {
            let scenario = Scenario::load(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            run_scenario(config, &scenario, pretty).await?;
        }
        Some(Commands::Demo) => {
            run_scenario(config, &Scenario::classic_deadlock(), true).await?;
        }
        Some(Commands::Check) => {
            println!(
                "Configuration OK (analytics: {}, default request units: {}, default resource units: {})",
                if config.analytics.enabled { "on" } else { "off" },
                config.defaults.request_units,
                config.defaults.resource_units,
            );
        }
        None => {
            println!(
                "waitgraph v{} - Use --help for commands",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SimulatorConfig> {
    match path {
        Some(path) => SimulatorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SimulatorConfig::default()),
    }
}

async fn run_scenario(config: SimulatorConfig, scenario: &Scenario, pretty: bool) -> anyhow::Result<()> {
    let (mut simulator, forwarder) = build_simulator(config)?;
    if let Some(name) = &scenario.name {
        info!(scenario = %name, steps = scenario.steps.len(), "running scenario");
    }

    let outcomes = ScenarioRunner::new(&mut simulator).run(scenario)?;

    // Dropping the simulator closes the analytics channel so the forwarder drains and exits.
    drop(simulator);
    if let Some(handle) = forwarder {
        handle.await.context("analytics forwarder panicked")?;
    }

    let output = if pretty {
        serde_json::to_string_pretty(&outcomes)?
    } else {
        serde_json::to_string(&outcomes)?
    };
    println!("{output}");
    Ok(())
}

fn build_simulator(config: SimulatorConfig) -> anyhow::Result<(Simulator, Option<JoinHandle<()>>)> {
    let analytics_enabled = config.analytics.enabled;
    let simulator = Simulator::new(config)?;
    if !analytics_enabled {
        return Ok((simulator, None));
    }

    let (sink, mut rx) = ChannelSink::bounded(ANALYTICS_BUFFER);
    let forwarder = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            forward_event(&event);
        }
    });
    Ok((simulator.with_sink(Arc::new(sink)), Some(forwarder)))
}

fn forward_event(event: &AnalyticsEvent) {
    match serde_json::to_string(event) {
        Ok(line) => info!(target: "waitgraph::analytics", "{line}"),
        Err(e) => warn!(error = %e, "could not encode analytics event"),
    }
}
