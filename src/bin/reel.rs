use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reel_wm::actor::reactor::{self, Script};
use reel_wm::common::config::{Config, config_file};
use reel_wm::common::log;
use reel_wm::layout_engine::PresetWidths;
use tracing::info;

#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Scrollable column tiling layout, driven headless")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a configuration file
    CheckConfig {
        /// Defaults to ~/.reel.toml
        path: Option<PathBuf>,
        /// Repair invalid values and write the file back
        #[arg(long)]
        fix: bool,
    },
    /// Resolve a preset width list for a column
    Presets {
        /// e.g. "50%, 100%, 1200px"
        spec: String,
        #[arg(long, default_value_t = 0)]
        min: i32,
        #[arg(long, default_value_t = 1888)]
        max: i32,
        #[arg(long, default_value_t = 8)]
        spacing: i32,
    },
    /// Run a RON event script against a headless host and print the layout
    Replay {
        script: PathBuf,
        /// Configuration to use instead of ~/.reel.toml
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the layout as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    log::init_logging();
    install_panic_hook();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::CheckConfig { path, fix } => check_config(&path.unwrap_or_else(config_file), fix),
        Commands::Presets { spec, min, max, spacing } => {
            let presets = PresetWidths::parse(&spec, spacing)?;
            let widths: Vec<String> = presets.get(min, max).iter().map(i32::to_string).collect();
            println!("{}", widths.join(", "));
            Ok(())
        }
        Commands::Replay { script, config, json } => {
            let config = Config::load_or_default(&config.unwrap_or_else(config_file))?;
            let script = Script::read(&script)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .context("starting runtime")?;
            let snapshot = runtime.block_on(reactor::replay(config, script));
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{snapshot}");
            }
            Ok(())
        }
    }
}

fn check_config(path: &Path, fix: bool) -> anyhow::Result<()> {
    let mut config = Config::read(path).with_context(|| format!("reading {}", path.display()))?;
    let issues = config.validate();
    if issues.is_empty() {
        println!("{}: ok", path.display());
        return Ok(());
    }
    for issue in &issues {
        println!("{}: {issue}", path.display());
    }
    if fix {
        let fixes = config.auto_fix_values();
        config.save(path)?;
        info!(fixes, path = %path.display(), "wrote repaired configuration");
        return Ok(());
    }
    anyhow::bail!("{} issue(s) found", issues.len())
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of unwinding out of the reactor.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
