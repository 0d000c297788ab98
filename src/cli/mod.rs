//! CLI module for Conclave
//!
//! Command-line parsing for the conclave-server binary. Uses clap for argument
//! parsing and owo-colors for colored terminal output.

pub mod ask;
pub mod init;
pub mod output;

use crate::agents::catalog::{PERSONAS, MAX_AGENTS_PER_SESSION};
use crate::utils::toml_config::{ConclaveConfig, ConfigError};
use clap::{Parser, Subcommand};
use output::Output;
use std::path::{Path, PathBuf};

/// Conclave - multi-persona collaboration server
///
/// Answers a question with a panel of expert personas and merges their
/// perspectives into one synthesis.
#[derive(Parser, Debug)]
#[command(
    name = "conclave-server",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Conclave - multi-persona LLM collaboration server",
    long_about = "Answers a question with a panel of up to 25 expert personas and merges\n\
                  their perspectives into one synthesis.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a config.",
    after_help = "EXAMPLES:\n    \
                  conclave-server init                     # Write conclave.toml and .env.example\n    \
                  conclave-server                          # Start the server\n    \
                  conclave-server roster                   # List the personas\n    \
                  conclave-server ask \"Review my plan\" -a 3  # One collaboration in the terminal"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "conclave.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (the default)
    Serve,

    /// Write conclave.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// List the persona catalog
    Roster,

    /// Run one collaboration and print the result
    Ask {
        /// The question to put to the panel
        query: String,

        /// Number of personas (1-25, default 7)
        #[arg(short, long)]
        agents: Option<i64>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Output helper honoring `--no-color`
    pub fn output(&self) -> Output {
        if self.no_color {
            Output::no_color()
        } else {
            Output::new()
        }
    }
}

/// Load the config for a one-shot command.
///
/// Runs before tracing is installed, so a missing file is reported on the
/// terminal rather than through the log.
pub fn load_config(path: &Path, output: &Output) -> Result<ConclaveConfig, ConfigError> {
    if path.exists() {
        return ConclaveConfig::load(path);
    }
    output.warning(&format!("{} not found, using defaults", path.display()));
    Ok(ConclaveConfig::default())
}

/// Print the persona catalog as a table
pub fn print_roster(output: &Output) {
    output.header(&format!(
        "Personas ({} total, up to {} per session)",
        PERSONAS.len(),
        MAX_AGENTS_PER_SESSION
    ));
    output.table_header(&[("ID", 14), ("Name", 22), ("Specialty", 48)]);
    for persona in PERSONAS {
        let name = format!("{} {}", persona.emoji, persona.name);
        output.table_row(&[(persona.id, 14), (name.as_str(), 22), (persona.specialty, 48)]);
    }
}
