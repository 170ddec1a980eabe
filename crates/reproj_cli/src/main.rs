//! Reproj CLI - batch reprojection of geospatial folders

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reproj_core::logging::{init_tracing, LogLevel};

mod commands;

#[derive(Parser)]
#[command(name = "reproj")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reproject every raster and vector in the input folder
    Run(commands::run::RunArgs),

    /// Write a default config file, or fill in missing settings of an existing one
    InitConfig {
        /// Where to write the config file
        path: PathBuf,

        /// Replace an existing file with the defaults
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr; run lines are printed by the run logger
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    init_tracing(level);

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.verbose),
        Commands::InitConfig { path, force } => commands::init_config::execute(&path, force),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_overrides() {
        let cli = Cli::parse_from([
            "reproj",
            "run",
            "--input",
            "/data/in",
            "--projection",
            "EPSG:3857",
            "--json",
            "--config",
            "reproj.toml",
            "--save",
            "-v",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.input, Some(PathBuf::from("/data/in")));
                assert_eq!(args.projection.as_deref(), Some("EPSG:3857"));
                assert!(args.json);
                assert!(args.save);
                assert_eq!(args.config, Some(PathBuf::from("reproj.toml")));
            }
            Commands::InitConfig { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn projection_and_projection_file_conflict() {
        let result = Cli::try_parse_from([
            "reproj",
            "run",
            "--projection",
            "EPSG:3857",
            "--projection-file",
            "target.prj",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn save_requires_config() {
        let result = Cli::try_parse_from(["reproj", "run", "--input", "/data/in", "--save"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_init_config() {
        let cli = Cli::parse_from(["reproj", "init-config", "reproj.toml", "--force"]);
        match cli.command {
            Commands::InitConfig { path, force } => {
                assert_eq!(path, PathBuf::from("reproj.toml"));
                assert!(force);
            }
            Commands::Run(_) => panic!("expected init-config"),
        }
    }
}
