use anyhow::{Context, Result};
use clap::Parser;
use quire::build::build_site;
use quire::cli::{Cli, Commands};
use quire::config::Config;
use quire::log;
use quire::serve::serve_site;
use std::net::SocketAddr;

fn main() -> Result<()> {
    if dotenv::dotenv().is_err() {
        log!("build"; "no .env file found, using the environment");
    }

    let cli = Cli::parse();
    let start = match &cli.root {
        Some(root) => root
            .canonicalize()
            .with_context(|| format!("Resolving root directory {}", root.display()))?,
        None => std::env::current_dir().context("Getting the current directory")?,
    };
    let mut config = Config::from_directory(&start).context("Loading configuration")?;
    config.apply_env(|name| std::env::var(name).ok());

    match cli.command {
        Commands::Build { output } => {
            if let Some(output) = output {
                config.output_directory = output;
            }
            build_site(&config).context("Building site")?;
        }
        Commands::Serve { interface, port } => {
            serve_site(&config, SocketAddr::new(interface, port))?;
        }
    }
    Ok(())
}
