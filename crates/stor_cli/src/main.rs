//! stor CLI
//!
//! Command-line access to any registered blob storage.
//!
//! # Commands
//!
//! - `ls` - List files and directories
//! - `exists` - Check whether a blob exists
//! - `meta` - Show blob metadata
//! - `cat` - Write a blob to stdout
//! - `put` - Store a blob from a file or stdin
//! - `rm` - Delete a blob
//! - `types` - List registered storage types

mod commands;

use clap::{Parser, Subcommand};
use commands::StorageArgs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// stor command-line blob storage tools.
#[derive(Parser)]
#[command(name = "stor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage type, e.g. LocalDir or Memory
    #[arg(global = true, short = 't', long = "type")]
    storage_type: Option<String>,

    /// Base path for storages that need one
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// JSON configuration file; --type and --path override its fields
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files and directories
    Ls {
        /// Directory to list (the storage root by default)
        #[arg(default_value = "")]
        dir: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check whether a blob exists
    Exists {
        /// Blob path
        blob: String,
    },

    /// Show blob metadata
    Meta {
        /// Blob path
        blob: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write a blob to stdout
    Cat {
        /// Blob path
        blob: String,

        /// Refuse blobs larger than this many bytes
        #[arg(short, long, default_value_t = commands::DEFAULT_MAX_SIZE)]
        max_size: u64,
    },

    /// Store a blob from a file or stdin
    Put {
        /// Blob path
        blob: String,

        /// Read content from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a blob
    Rm {
        /// Blob path
        blob: String,
    },

    /// List registered storage types
    Types,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let storage = StorageArgs {
        storage_type: cli.storage_type,
        path: cli.path,
        config: cli.config,
    };
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Ls { dir, format } => {
            let storage = storage.open()?;
            commands::list::run(storage.as_ref(), &dir, &format, &mut stdout)?;
        }
        Commands::Exists { blob } => {
            let storage = storage.open()?;
            if !commands::blob::exists(storage.as_ref(), &blob, &mut stdout)? {
                stdout.flush()?;
                std::process::exit(1);
            }
        }
        Commands::Meta { blob, format } => {
            let storage = storage.open()?;
            commands::blob::meta(storage.as_ref(), &blob, &format, &mut stdout)?;
        }
        Commands::Cat { blob, max_size } => {
            let storage = storage.open()?;
            commands::blob::cat(storage.as_ref(), &blob, max_size, &mut stdout)?;
        }
        Commands::Put { blob, file } => {
            let mut storage = storage.open()?;
            let data = match file {
                Some(file) => std::fs::read(file)?,
                None => commands::blob::read_all(io::stdin().lock())?,
            };
            commands::blob::put(storage.as_mut(), &blob, &data)?;
        }
        Commands::Rm { blob } => {
            let mut storage = storage.open()?;
            commands::blob::remove(storage.as_mut(), &blob)?;
        }
        Commands::Types => {
            commands::types::run(&stor_core::Registry::with_builtin(), &mut stdout)?;
        }
        Commands::Version => {
            writeln!(stdout, "stor CLI v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(stdout, "stor core v{}", stor_core::VERSION)?;
        }
    }

    Ok(())
}
