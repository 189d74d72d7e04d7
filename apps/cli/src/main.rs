//! nearcred CLI
//!
//! Command-line tool for generating and inspecting NEAR account keys in the
//! local `.near-credentials` store.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nearcred_keystore::{default_base_dir, key_path, Ed25519KeyPair};

/// nearcred - unencrypted local NEAR credential store
#[derive(Parser)]
#[command(name = "nearcred")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base directory of the credentials store (defaults to the home directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// NEAR network the key belongs to
    #[arg(short, long, default_value = "testnet")]
    network: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key pair and write it to the store
    Generate {
        /// Account ID to generate a key for
        account_id: String,

        /// Overwrite an existing key file
        #[arg(long)]
        force: bool,
    },

    /// Show the stored key pair for an account
    Show {
        /// Account ID to look up
        account_id: String,

        /// Also print the private key
        #[arg(long)]
        private: bool,
    },

    /// Print the store path for an account without touching the file system
    Path {
        /// Account ID to resolve
        account_id: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,nearcred_cli=info,nearcred_keystore=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => default_base_dir().context("Failed to resolve the credentials base directory")?,
    };

    match cli.command {
        Commands::Generate { account_id, force } => {
            let path = key_path(&base_dir, &cli.network, &account_id);
            if path.exists() && !force {
                bail!(
                    "key file {} already exists (pass --force to overwrite)",
                    path.display()
                );
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }

            let keypair = Ed25519KeyPair::generate(&account_id)?;
            let written = keypair.write(&base_dir, &cli.network)?;
            info!("Generated key for {} on {}", account_id, cli.network);
            println!("{}", keypair.public_key());
            println!("{}", written.display());
        }

        Commands::Show { account_id, private } => {
            let keypair = Ed25519KeyPair::load(&base_dir, &cli.network, &account_id)
                .with_context(|| format!("Failed to load key for {account_id}"))?;
            println!("{}", keypair.public_key());
            if private {
                println!("{}", keypair.private_key());
            }
        }

        Commands::Path { account_id } => {
            println!("{}", key_path(&base_dir, &cli.network, &account_id).display());
        }
    }

    Ok(())
}
