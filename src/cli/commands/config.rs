//! Config command implementation.

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::cli::output::{OutputFormat, get_formatter};
use crate::models::Config;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

pub async fn handle_config(cmd: ConfigCommand, format: OutputFormat, _verbose: bool) -> Result<()> {
    let formatter = get_formatter(format);

    match cmd {
        ConfigCommand::Show => {
            let config = Config::load()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Text => print!("{}", toml::to_string_pretty(&config)?),
            }
        }
        ConfigCommand::Init { force } => {
            if let Some(path) = Config::config_path()
                && path.exists()
                && !force
            {
                anyhow::bail!(
                    "config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            let config = Config::default();
            config.save().context("failed to write config file")?;
            if let Some(path) = Config::config_path() {
                print!(
                    "{}",
                    formatter.format_message(&format!("Wrote default config to {}", path.display()))
                );
            }
        }
        ConfigCommand::Path => {
            let path = Config::config_path()
                .context("could not determine config directory")?;
            print!("{}", formatter.format_message(&path.display().to_string()));
        }
    }

    Ok(())
}
