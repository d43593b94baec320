//! Config command - inspect and create the configuration file.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use datanozzle_store::{Config, default_config_dir, default_config_path};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write the effective configuration to the config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, config: &Config, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(config, cli),
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Init { force } => init_config(config, cli, *force),
    }
}

/// Path the CLI reads its configuration from.
fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(default_config_path)
}

fn show_config(config: &Config, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            println!("datanozzle configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Base URL:        {}", config.base_url);
            println!("Timeout:         {}s", config.timeout_secs);
            match config.rows_per_page {
                Some(rows) => println!("Rows per page:   {rows}"),
                None => println!("Rows per page:   server default"),
            }
            match &config.allowed_domains {
                Some(domains) => println!("Allowed domains: {}", domains.join(", ")),
                None => println!("Allowed domains: any"),
            }
            println!("Log level:       {}", config.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = config_path(cli);

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_file.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(config: &Config, cli: &Cli, force: bool) -> Result<()> {
    let path = config_path(cli);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    config.save_to(&path)?;
    info!(path = %path.display(), "Config file written");
    if !cli.quiet {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli_with_config(path: &std::path::Path, extra: &[&str]) -> Cli {
        let mut argv = vec!["nozzle", "--quiet", "--config", path.to_str().unwrap()];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_config_path_prefers_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        let cli = cli_with_config(&path, &[]);
        assert_eq!(config_path(&cli), path);
    }

    #[test]
    fn test_init_writes_effective_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cli = cli_with_config(&path, &["--base-url", "https://dg.example.org/"]);
        let config = crate::load_config(&cli).unwrap();

        init_config(&config, &cli, false).unwrap();

        let written = Config::load_from(&path).unwrap();
        assert_eq!(written.base_url, "https://dg.example.org/");
        assert_eq!(written.timeout_secs, 30);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let cli = cli_with_config(&path, &[]);
        let config = Config::default();

        init_config(&config, &cli, false).unwrap();
        let err = init_config(&config, &cli, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        init_config(&config, &cli, true).unwrap();
    }

    #[test]
    fn test_config_subcommands_parse() {
        let cli = Cli::try_parse_from(["nozzle", "config", "init", "--force"]).unwrap();
        match cli.command {
            Some(crate::Commands::Config(ConfigArgs {
                action: ConfigAction::Init { force },
            })) => assert!(force),
            _ => panic!("expected config init"),
        }
    }
}
