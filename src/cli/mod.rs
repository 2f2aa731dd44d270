//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_DIRECTORY;

pub mod commands;

/// cdeploy - Move content between stores through version-controlled dumps
#[derive(Parser, Debug)]
#[command(name = "cdeploy", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (default: nearest cdeploy.yml, then ~/.cdeploy/cdeploy.yml)
    #[arg(long, global = true, env = "CDEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path (default: from settings, then content.db beside them)
    #[arg(long, global = true, env = "CDEPLOY_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create cdeploy.yml, the dump directory and the database
    Init {
        /// Overwrite existing settings
        #[arg(long)]
        force: bool,
    },

    /// Live store schema management
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },

    /// Write dumps of the configured exports
    Export {
        /// Directory key to export to
        #[arg(long, default_value = DEFAULT_DIRECTORY)]
        destination: String,
    },

    /// Import staged dumps into the live store
    Import {
        /// Directory key to import from
        #[arg(long, default_value = DEFAULT_DIRECTORY)]
        source: String,

        /// Dependency names to import (default: every staged dump)
        names: Vec<String>,
    },

    /// Show differences between live records and staged dumps
    Diff {
        /// Directory key to compare against
        #[arg(long, default_value = DEFAULT_DIRECTORY)]
        source: String,

        /// Compare a single dependency name
        #[arg(long)]
        name: Option<String>,

        /// Lines of context around each change
        #[arg(short = 'U', long, default_value = "3")]
        context: usize,
    },

    /// Summarize a staged directory against the live store
    Status {
        /// Directory key to inspect
        #[arg(long, default_value = DEFAULT_DIRECTORY)]
        source: String,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Schema Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Register entity types, fields and config objects from a YAML file
    Load {
        /// Schema file
        file: PathBuf,
    },

    /// List registered entity types with record counts
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_import_names_and_defaults() {
        let cli = Cli::parse_from([
            "cdeploy",
            "import",
            "node:article:UUID-1",
            "taxonomy_term:tags:UUID-2",
        ]);
        match cli.command {
            Commands::Import { source, names } => {
                assert_eq!(source, "sync");
                assert_eq!(names, vec!["node:article:UUID-1", "taxonomy_term:tags:UUID-2"]);
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cdeploy", "diff", "--json", "-vv", "--context", "1"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Diff { context: 1, .. }));
    }
}
