//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Classify positions into a configurable hierarchy by custom fields and linked values
#[derive(Parser, Debug)]
#[command(name = "orgtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Snapshot file (overrides config `data_file`)
    #[arg(short = 'f', long, global = true, env = "ORGTREE_DATA_FILE", value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    /// Project directory holding a local .orgtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and print a tree (default tree when no id is given)
    Tree {
        /// Tree definition id
        tree_id: Option<uuid::Uuid>,
        /// Ignore tree definitions and list positions flat
        #[arg(long, conflicts_with = "tree_id")]
        flat: bool,
        /// Output format (default: config `format`)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// List tree definitions
    Trees,

    /// Show the resolved custom fields of a position
    Position {
        /// Position id
        id: i64,
        /// Output format (default: config `format`)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Validate a custom-field selection request (JSON) against the catalog
    Validate {
        /// Request file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Init,

    /// Show config paths
    Path,
}
