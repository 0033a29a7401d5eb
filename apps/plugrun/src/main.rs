use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use plugrun_container::{ContainerRunner, ContainerRunnerConfig, DockerEngine};
use plugrun_core::{Runner, Store};
use plugrun_exec::BareRunner;
use plugrun_model::{Plugin, PluginKind};
use plugrun_observe::{LoggerConfig, init_logger};
use plugrun_store::JsonStore;

/// The main entry point to the plugin running system.
#[derive(Parser)]
#[command(name = "plugrun", version)]
struct Cli {
    /// Directory holding the plugin directory file.
    #[arg(long, global = true)]
    location: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `plugrun=debug`.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Adds a new plugin to the list of plugins.
    Add {
        #[arg(long)]
        name: String,
        /// Container image backing the plugin.
        #[arg(long, conflicts_with = "dir")]
        image: Option<String>,
        /// Directory holding the plugin executable (named after the plugin).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Lists all registered plugins.
    List {
        /// Only show plugins of this kind.
        #[arg(long, value_parser = parse_kind)]
        kind: Option<PluginKind>,
    },
    /// Removes a registered plugin.
    Remove {
        #[arg(long)]
        name: String,
    },
    /// Runs a plugin.
    Run {
        #[arg(long)]
        name: String,
        /// Arguments handed to the plugin.
        #[arg(long, value_delimiter = ',')]
        args: Vec<String>,
        /// Maximum runtime in seconds for container plugins.
        #[arg(long, default_value_t = 15)]
        max_runtime: u64,
    },
}

fn parse_kind(s: &str) -> Result<PluginKind, String> {
    match s {
        "bare" => Ok(PluginKind::Bare),
        "container" => Ok(PluginKind::Container),
        other => Err(format!("unknown plugin kind: {other} (expected bare|container)")),
    }
}

fn default_location() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir().context("failed to resolve the user config directory")?;
    Ok(base.join("plugrun"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logger(&LoggerConfig {
        level: cli.log_level.clone(),
        ..Default::default()
    })?;

    let location = match &cli.location {
        Some(location) => location.clone(),
        None => default_location()?,
    };
    let store = Arc::new(JsonStore::new(&location)?);

    match cli.command {
        Command::Add { name, image, dir } => add(store, name, image, dir).await,
        Command::List { kind } => list(store, kind).await,
        Command::Remove { name } => {
            store.delete(&name).await?;
            Ok(())
        }
        Command::Run {
            name,
            args,
            max_runtime,
        } => run(store, &name, &args, max_runtime).await,
    }
}

async fn add(
    store: Arc<JsonStore>,
    name: String,
    image: Option<String>,
    dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let plugin = match (image, dir) {
        (Some(image), None) => Plugin::container(name, image),
        (None, Some(dir)) => Plugin::bare(name, dir),
        _ => bail!("exactly one of --image or --dir is required"),
    };
    store.create(&plugin).await?;
    Ok(())
}

async fn list(store: Arc<JsonStore>, kind: Option<PluginKind>) -> anyhow::Result<()> {
    let plugins = store.list().await?;
    println!("{:<20} {:<10} {}", "NAME", "KIND", "IMAGE/LOCATION");
    for plugin in plugins {
        if kind.is_some_and(|k| k != plugin.kind()) {
            continue;
        }
        let payload = match &plugin.spec {
            plugrun_model::PluginSpec::Container { image } => image.clone(),
            plugrun_model::PluginSpec::Bare { location } => location.display().to_string(),
        };
        println!("{:<20} {:<10} {}", plugin.name, plugin.kind(), payload);
    }
    Ok(())
}

async fn run(
    store: Arc<JsonStore>,
    name: &str,
    args: &[String],
    max_runtime: u64,
) -> anyhow::Result<()> {
    let engine = Arc::new(DockerEngine::connect()?);

    // Chain of responsibility: container runner first, bare runner as the
    // terminal link.
    let bare = Arc::new(BareRunner::new(store.clone()));
    let runner = ContainerRunner::new(
        store,
        engine,
        ContainerRunnerConfig {
            max_command_runtime: Duration::from_secs(max_runtime),
        },
    )?
    .with_next(bare);

    let outcome = runner.run(name, args).await?;

    print!("{}", outcome.output);
    if !outcome.status.is_success() {
        bail!("plugin {name} {}", outcome.status);
    }
    info!(target: "plugrun", %name, "all done");
    Ok(())
}
