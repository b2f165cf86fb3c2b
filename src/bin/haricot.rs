//! Haricot CLI
//!
//! Checks and exports manager documents, and prints the demonstration manager.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use haricot_schemas::{
    example, run_registration, HaricotConfig, Manager, ManagerDocument, ManagerSnapshot,
    OutputFormat,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "haricot")]
#[command(about = "Check and export settings-panel manager definitions")]
struct Cli {
    /// Configuration file (defaults to haricot.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a manager document and report every problem in it
    Check {
        /// Manager document (.toml or .json)
        file: PathBuf,
    },

    /// Print the render snapshot of a manager document as JSON
    Export {
        /// Manager document (.toml or .json)
        file: PathBuf,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Build the demonstration manager and print its outline
    Demo {
        /// Context to run registration for
        #[arg(long)]
        context: Option<String>,
        /// Print the manager as a TOML document instead of an outline
        #[arg(long)]
        toml: bool,
    },

    /// Print the effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config =
        HaricotConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Check { file } => {
            let manager = load_manager(&file, &config)?;
            let violations = manager.validate();
            for lint in manager.lint_defaults() {
                println!("⚠️  {}", lint);
            }

            if violations.is_empty() {
                println!(
                    "✅ {} - {} sections, {} settings, {} controls",
                    manager.id(),
                    manager.sections().count(),
                    manager.settings().count(),
                    manager.controls().count()
                );
                return Ok(());
            }

            println!("❌ {} - {} problem(s):", manager.id(), violations.len());
            for violation in &violations {
                println!("   └─ {}", violation);
            }
            if config.validation.strict {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Export { file, compact } => {
            let mut manager = load_manager(&file, &config)?;
            manager.freeze();

            let format = if compact {
                OutputFormat::Compact
            } else {
                config.export.output_format
            };
            let snapshot = ManagerSnapshot::from_manager(&manager)?;
            println!("{}", snapshot.render(format)?);
            Ok(())
        }

        Commands::Demo { context, toml } => {
            let context = context.unwrap_or_else(|| config.registry.context.clone());
            let mut manager = example::empty_manager().with_policy(config.registry.duplicates);
            run_registration(&mut manager, &[&example::HaricotExample::default()], &context)?;
            manager.freeze();
            if toml {
                print!("{}", ManagerDocument::from_manager(&manager)?.to_toml_string()?);
            } else {
                print_outline(&manager, &context);
            }
            Ok(())
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn load_manager(file: &Path, config: &HaricotConfig) -> anyhow::Result<Manager> {
    let document =
        ManagerDocument::load(file).with_context(|| format!("reading {}", file.display()))?;
    let manager = document
        .into_manager(config.registry.duplicates)
        .with_context(|| format!("registering {}", file.display()))?;
    Ok(manager)
}

fn print_outline(manager: &Manager, context: &str) {
    println!("{} ({}) for context '{}'", manager.label(), manager.id(), context);
    if manager.sections().next().is_none() {
        println!("   (nothing registered)");
        return;
    }

    for section in manager.sections() {
        match &section.icon {
            Some(icon) => println!("  [{}] {} ({})", section.id, section.label, icon),
            None => println!("  [{}] {}", section.id, section.label),
        }
        for control in manager.list_controls_by_section(&section.id) {
            let default = manager
                .get_setting(&control.setting)
                .ok()
                .and_then(|s| s.default.as_ref())
                .map(|d| format!(" = {}", d))
                .unwrap_or_default();
            println!(
                "     {:<20} {:<15} {}{}",
                control.id,
                control.control_type.as_str(),
                control.label,
                default
            );
        }
    }
}
