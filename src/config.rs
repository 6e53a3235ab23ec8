use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::legacy;

#[derive(Debug, Parser)]
#[command(name = "train")]
#[command(about = "Personal training log: routines, workout history and body metrics")]
pub struct Cli {
    #[command(flatten)]
    pub paths: Paths,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run; plain `train` serves on the default address.
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }
}

/// File locations shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Paths {
    /// SQLite database file
    #[arg(long = "db", env = "TRAIN_DB", default_value = "train.db", global = true)]
    pub db: PathBuf,

    /// Legacy JSON plan, imported once when the database does not exist
    #[arg(long, env = "TRAIN_LEGACY_JSON", default_value = "train.json", global = true)]
    pub legacy_json: PathBuf,

    /// Directory served at `/`
    #[arg(long, env = "TRAIN_STATIC_DIR", default_value = "public", global = true)]
    pub static_dir: PathBuf,
}

impl Paths {
    pub fn backup_path(&self) -> PathBuf {
        legacy::backup_path(&self.legacy_json)
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Import the legacy JSON plan into a new database, then exit
    Import,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port for HTTP API
    #[arg(short, long, default_value_t = 3001)]
    pub port: u16,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3001,
        }
    }
}

impl ServeArgs {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
