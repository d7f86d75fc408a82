use clap::{Parser, Subcommand};
use naturaapp::environment::EnvironmentSetting;
use naturaapp::model::CreationKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "natura", bin_name = "natura", version)]
#[command(about = "Browse, back up and restore your Natura illustrations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to NATURA_DATA_DIR, then the OS data directory)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Storage environment: auto, browser or native
    #[arg(long, global = true, value_name = "ENV", help_heading = "Options")]
    pub environment: Option<EnvironmentSetting>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a new creation
    #[command(alias = "n")]
    Add {
        /// plant, animal or insect
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        kind: CreationKind,

        /// Common name
        #[arg(long, short = 'n')]
        name: String,

        /// Image: http(s) URL, inline data URI, or a local image file
        #[arg(long, short = 'i')]
        image: String,

        #[arg(long, short = 's', default_value = "")]
        scientific_name: String,

        #[arg(long, short = 'd', default_value = "")]
        description: String,
    },

    /// List creations, newest first
    #[command(alias = "ls")]
    List {
        /// Only show one type
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        kind: Option<CreationKind>,
    },

    /// Show creations in full
    View {
        /// Indexes (e.g. 1 3 2-4) or ids
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Delete creations
    #[command(alias = "rm")]
    Delete {
        /// Indexes (e.g. 1 3 2-4) or ids
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Write a backup file with every creation
    Export,

    /// Restore creations from a backup file
    Import {
        file: PathBuf,

        /// Delete the current collection before importing
        #[arg(long)]
        replace: bool,
    },

    /// Report the legacy migration and remove unusable records
    Doctor,

    /// Manage the identification service API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Summarize the collection and the active storage backend
    Status,
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Show the stored key (masked)
    Get {
        /// Print the full key
        #[arg(long)]
        reveal: bool,
    },
    /// Store a new key
    Set { value: String },
}
