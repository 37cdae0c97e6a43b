// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

use crate::releases::{DEFAULT_OWNER, DEFAULT_REPO};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "cdda-tools",
    version = "0.1.0",
    about = "CLI companion tools for Cataclysm-DDA",
    long_about = "cdda-tools generates the LaTeX keybindings documentation from the game's \
                  keybindings.json files and fetches per-release download statistics from \
                  the GitHub API."
)]
pub struct Cli {
    /// Set the logging level
    ///
    /// Applies to every subcommand, so it lives on the top-level parser
    #[arg(short = 'l', long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    // The #[command(subcommand)] attribute tells clap that this field
    // will hold one of the subcommands defined in the Commands enum
    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (keybindings, releases)
//
// Each variant represents a different subcommand the user can run
// The fields inside each variant become the arguments for that subcommand
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the LaTeX keybindings documentation
    ///
    /// Example: cdda-tools keybindings data/raw/keybindings.json -a data/raw/keybindings/magic.json
    Keybindings {
        /// Path to CDDA keybindings.json input file
        ///
        /// This is a positional argument (required, no flag needed)
        keybindings: PathBuf,

        /// Add other input files to input
        ///
        /// Repeatable: each -a adds one more JSON file, merged after the
        /// main input
        #[arg(short = 'a', value_name = "FILE", action = clap::ArgAction::Append)]
        additional_input: Vec<PathBuf>,

        /// Path to latex output file
        #[arg(short, long, default_value = "./cdda_keybindings.tex")]
        output: PathBuf,

        /// Template path
        #[arg(short, long, default_value = "./cdda_keybindings_template.tex")]
        template: PathBuf,
    },

    /// Fetch release download statistics from the GitHub API
    ///
    /// Example: cdda-tools releases --owner CleverRaven --repo Cataclysm-DDA
    Releases {
        /// Repository owner
        #[arg(long, default_value = DEFAULT_OWNER)]
        owner: String,

        /// Repository name
        #[arg(long, default_value = DEFAULT_REPO)]
        repo: String,
    },
}

// The accepted --log-level values, mapped onto tracing's level filters
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}
