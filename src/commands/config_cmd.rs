use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;

use super::OutputFormat;
use crate::config::{Config, ConfigValue};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        print_value("api_base_url", &config.api_base_url, |v| v.clone());
                        print_value("database_path", &config.database_path, |v| {
                            v.display().to_string()
                        });
                        print_value("data_dir", &config.data_dir, |v| v.display().to_string());
                        print_value("display_name", &config.display_name, |v| v.clone());
                        print_value("email_prefix", &config.email_prefix, |v| v.clone());
                        print_value("request_timeout_secs", &config.request_timeout_secs, |v| {
                            v.map(|secs| secs.to_string())
                                .unwrap_or_else(|| "none".to_string())
                        });
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = Config::default_config_path();

                // Check if config already exists
                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'cloakroom config show' to view current configuration.");
                    return Ok(());
                }

                // Create parent directory
                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(Config::template().as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}

fn print_value<T>(key: &str, value: &ConfigValue<T>, render: impl Fn(&T) -> String) {
    println!("{}: {}", key, render(&value.value));
    println!("  source: {}", value.source);
    println!();
}
