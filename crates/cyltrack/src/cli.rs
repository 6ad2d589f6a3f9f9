//! Clap derive structures for the `cyltrack` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Also compiled by `build.rs` for man pages, so only clap types here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cyltrack -- gas cylinder inventory from the command line
#[derive(Debug, Parser)]
#[command(
    name = "cyltrack",
    version,
    about = "Track gas cylinder inventory from the command line",
    long_about = "Manage cylinder types and cylinders, flag low stock, and look up\n\
        cylinders by their six-digit ID, typed or read from a QR/barcode scanner.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory holding the inventory files (overrides config)
    #[arg(long, env = "CYLTRACK_DATA_DIR", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "CYLTRACK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

impl GlobalOpts {
    pub fn output(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    /// Weighed in kg, with a tare weight
    Mass,
    /// Gauge reading in PSI
    Pressure,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage cylinder types
    #[command(alias = "t")]
    Types(TypesArgs),

    /// Manage cylinders
    #[command(alias = "cyl", alias = "c")]
    Cylinders(CylindersArgs),

    /// Look up a cylinder by ID, or listen to a scanner
    Scan(ScanArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Types ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TypesArgs {
    #[command(subcommand)]
    pub command: TypesCommand,
}

#[derive(Debug, Subcommand)]
pub enum TypesCommand {
    /// List cylinder types with cylinder and low-stock counts
    #[command(alias = "ls")]
    List,

    /// Add a cylinder type
    Add {
        /// Display name, e.g. "CO2"
        name: String,

        /// How cylinders of this type are measured
        #[arg(long, short = 'u', value_enum, default_value = "mass")]
        unit: UnitArg,
    },

    /// Delete a type and every cylinder of that type
    #[command(alias = "rm")]
    Delete {
        /// Type ID
        id: String,
    },
}

// ── Cylinders ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CylindersArgs {
    #[command(subcommand)]
    pub command: CylindersCommand,
}

#[derive(Debug, Subcommand)]
pub enum CylindersCommand {
    /// List cylinders
    #[command(alias = "ls")]
    List {
        /// Only cylinders of this type ID
        #[arg(long = "type", short = 't', value_name = "TYPE_ID")]
        type_id: Option<String>,

        /// Only low-stock cylinders
        #[arg(long)]
        low: bool,
    },

    /// Add an empty cylinder of a type
    Add {
        /// Type ID
        type_id: String,
    },

    /// Show cylinder details
    Get {
        /// Six-digit cylinder ID
        id: String,
    },

    /// Record new readings
    Update {
        /// Six-digit cylinder ID
        id: String,

        /// Total weight (kg) for mass types, pressure (PSI) otherwise
        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        /// Empty-container weight (kg); mass types only
        #[arg(long, allow_negative_numbers = true)]
        tare: Option<f64>,
    },

    /// Delete a cylinder
    #[command(alias = "rm")]
    Delete {
        /// Six-digit cylinder ID
        id: String,
    },

    /// Show the QR payload and image link for a cylinder
    Qr {
        /// Six-digit cylinder ID
        id: String,
    },
}

// ── Scan ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(arg_required_else_help = true)]
pub struct ScanArgs {
    /// Six-digit cylinder ID
    #[arg(conflicts_with = "listen", required_unless_present = "listen")]
    pub id: Option<String>,

    /// Read IDs from a line-oriented scanner until end of input or Ctrl-C
    #[arg(long)]
    pub listen: bool,

    /// Scanner device path (overrides scanner.device; `-` for stdin)
    #[arg(long, requires = "listen", value_name = "PATH")]
    pub device: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value
    Set {
        /// Dotted key, e.g. "scanner.device" or "qr.size"
        key: String,

        /// Value to set
        value: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
