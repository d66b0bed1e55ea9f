//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Builds or serves a personal site from markdown content
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Directory to search upward from for `quire.yaml` (default: the
    /// current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Deletes the output directory if there is one and rebuilds the site
    Build {
        /// Output directory (default: `public` next to `quire.yaml`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve the site, rendering every page from disk on each request
    Serve {
        /// Interface to bind on
        #[arg(short, long, default_value = "127.0.0.1")]
        interface: IpAddr,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["quire", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { interface, port } => {
                assert_eq!("127.0.0.1".parse::<IpAddr>().unwrap(), interface);
                assert_eq!(8080, port);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_build_with_root_and_output() {
        let cli = Cli::try_parse_from(["quire", "--root", "site", "build", "-o", "dist"]).unwrap();
        assert_eq!(Some(PathBuf::from("site")), cli.root);
        match cli.command {
            Commands::Build { output } => assert_eq!(Some(PathBuf::from("dist")), output),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
