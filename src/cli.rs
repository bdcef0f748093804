use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arrlink")]
#[command(author, version, about = "Client for Radarr, Sonarr, Lidarr and Readarr servers")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the server's status and negotiated API dialect
    Status {
        /// Instance name from the config file
        instance: String,
    },

    /// List tags
    Tags {
        /// Instance name from the config file
        instance: String,

        /// Include the items each tag is attached to
        #[arg(long)]
        detail: bool,
    },

    /// List quality profiles
    Profiles {
        /// Instance name from the config file
        instance: String,
    },

    /// List root folders
    RootFolders {
        /// Instance name from the config file
        instance: String,
    },

    /// Search a movie or series server for new items
    Search {
        /// Instance name from the config file
        instance: String,

        /// Search term
        #[arg(required = true)]
        term: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
