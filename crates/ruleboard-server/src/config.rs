use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ruleboard_core::FlatFileStore;
use ruleboard_relay::{OllamaClient, Relay};

use crate::AppState;

#[derive(Parser, Debug)]
#[command(name = "ruleboard")]
#[command(about = "Rules catalog and architecture diagram backend", version)]
pub struct Cli {
    /// Directory holding the JSON documents
    #[arg(long, env = "RULEBOARD_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Address the HTTP server listens on
    #[arg(long, env = "RULEBOARD_BIND", default_value = "127.0.0.1:3000", global = true)]
    pub bind: SocketAddr,

    /// Built UI assets served for every non-API path
    #[arg(long, env = "RULEBOARD_STATIC_DIR", global = true)]
    pub static_dir: Option<PathBuf>,

    /// Cargo manifest whose dependencies are described to the model
    #[arg(long, env = "RULEBOARD_MANIFEST", default_value = "Cargo.toml", global = true)]
    pub manifest: PathBuf,

    #[arg(long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434", global = true)]
    pub ollama_base_url: String,

    /// Model used when a chat request names none
    #[arg(long, env = "OLLAMA_MODEL", default_value = "qwen3-vl:8b", global = true)]
    pub ollama_model: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Replace the rules catalog with rules parsed from an extracted text table
    ImportRules {
        file: PathBuf,
        /// Print the parsed rules instead of saving them
        #[arg(long)]
        dry_run: bool,
    },
    /// Ask the model about one rule and stream the answer to stdout
    Chat {
        #[arg(long)]
        rule: String,
        question: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// Check that Ollama is up and report the model it would use
    Status,
}

impl Cli {
    pub fn store(&self) -> FlatFileStore {
        FlatFileStore::new(&self.data_dir)
    }

    pub fn relay(&self) -> Relay {
        let client = OllamaClient::new(&self.ollama_base_url, &self.ollama_model);
        Relay::new(client, self.store(), self.manifest.clone())
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            store: self.store(),
            relay: self.relay(),
            static_dir: self.static_dir.clone(),
        }
    }
}
