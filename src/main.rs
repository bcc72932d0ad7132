//! Partscope CLI - Inspect scoped views over component catalogs

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use partscope::config::{self, load_config};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "partscope")]
#[command(version)]
#[command(about = "Scoped views over component catalogs")]
#[command(long_about = r#"
Partscope reads a catalog manifest (assemblies, types, members, exports and
their scope declarations) and tells you which exports each named scope sees.

Example usage:
  partscope check --manifest catalog.toml
  partscope resolve --scope foo
  partscope explain --scope quoi --contract IncludedTestPropName
  partscope lookup --scope bar --contract TestType --contract ChildTestType
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "human")]
    format: OutputMode,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the exports visible in a scope
    Resolve {
        /// Scope name (defaults to default_scope from the config)
        #[arg(short, long)]
        scope: Option<String>,

        /// Path to the catalog manifest
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Also list excluded exports with their verdicts
        #[arg(short, long)]
        all: bool,
    },

    /// Show which rule group decides an export's visibility
    Explain {
        /// Scope name
        #[arg(short, long)]
        scope: Option<String>,

        /// Contract name of the export
        #[arg(long)]
        contract: String,

        /// Path to the catalog manifest
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Validate a catalog manifest and report every problem
    Check {
        /// Path to the catalog manifest
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// List every scope declared in a catalog
    Scopes {
        /// Path to the catalog manifest
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Show statistics about a catalog
    Stats {
        /// Path to the catalog manifest
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Resolve contracts through a child container for a scope
    Lookup {
        /// Scope name
        #[arg(short, long)]
        scope: Option<String>,

        /// Contract to resolve (repeatable)
        #[arg(long = "contract", required = true)]
        contracts: Vec<String>,

        /// Do not fall back to the parent container
        #[arg(long)]
        no_inherit: bool,

        /// Path to the catalog manifest
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Write a partscope.toml config
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,

        /// Manifest path to store in the config
        #[arg(short, long)]
        manifest: Option<String>,

        /// Default scope to store in the config
        #[arg(short, long)]
        scope: Option<String>,
    },

    /// Print version information
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

/// JSON envelope wrapping a command's payload
fn envelope(ok: bool, command: &str, data: serde_json::Value) -> serde_json::Value {
    let mut envelope = serde_json::json!({
        "ok": ok,
        "command": command,
    });
    let payload = if ok { "data" } else { "error" };
    envelope[payload] = data;
    envelope
}

/// Print a JSON success envelope for machine-readable output
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    debug_assert!(!output_mode.is_human());
    println!("{}", serde_json::to_string_pretty(&envelope(true, command, data))?);
    Ok(())
}

/// Print a JSON failure envelope; the command still exits with an error
pub fn emit_error(output_mode: OutputMode, command: &str, error: serde_json::Value) -> anyhow::Result<()> {
    debug_assert!(!output_mode.is_human());
    println!("{}", serde_json::to_string_pretty(&envelope(false, command, error))?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    let cfg = load_config(cli.config.as_deref())?;
    let cfg = cfg.as_ref();
    let mode = cli.format;

    match cli.command {
        Commands::Resolve { scope, manifest, all } => {
            let manifest = config::resolve_manifest(manifest, cfg);
            let scope = config::resolve_scope(scope, cfg)?;
            tracing::info!("Resolving scope '{}' over {}", scope, manifest.display());
            commands::run_resolve(mode, &manifest, &scope, all)
        }

        Commands::Explain { scope, contract, manifest } => {
            let manifest = config::resolve_manifest(manifest, cfg);
            let scope = config::resolve_scope(scope, cfg)?;
            commands::run_explain(mode, &manifest, &scope, &contract)
        }

        Commands::Check { manifest } => {
            let manifest = config::resolve_manifest(manifest, cfg);
            commands::run_check(mode, &manifest)
        }

        Commands::Scopes { manifest } => {
            let manifest = config::resolve_manifest(manifest, cfg);
            commands::run_scopes(mode, &manifest)
        }

        Commands::Stats { manifest } => {
            let manifest = config::resolve_manifest(manifest, cfg);
            commands::run_stats(mode, &manifest)
        }

        Commands::Lookup { scope, contracts, no_inherit, manifest } => {
            let manifest = config::resolve_manifest(manifest, cfg);
            let scope = config::resolve_scope(scope, cfg)?;
            commands::run_lookup(mode, &manifest, &scope, &contracts, !no_inherit)
        }

        Commands::Init { force, manifest, scope } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            commands::run_init(mode, &path, force, manifest, scope)
        }

        Commands::Version => commands::run_version(mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let value = envelope(true, "scopes", serde_json::json!({ "scopes": ["foo"] }));
        assert_eq!(value["ok"], true);
        assert_eq!(value["command"], "scopes");
        assert_eq!(value["data"]["scopes"][0], "foo");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_envelope_is_not_ok() {
        let value = envelope(false, "check", serde_json::json!({ "problems": ["bad"] }));
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["problems"][0], "bad");
        assert!(value.get("data").is_none());
    }
}
