use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

mod commands;

/// Mortar build orchestrator.
///
/// Mortar turns named groups of source files ("packages") and their
/// compositions ("bundles") into generated artifacts, one per named build
/// profile, with timestamp-based incremental rebuilds, optional
/// minification, source maps, and shared headers.
///
/// EXAMPLES:
///     mortar build                 Build everything that is out of date
///     mortar build --force         Rebuild regardless of timestamps
///     mortar init                  Scaffold a mortar.yml
///
/// ENVIRONMENT VARIABLES:
///     MORTAR_JSON       Set to '1' for JSON output by default
///     NO_COLOR          Set to disable colored output
#[derive(Parser)]
#[command(name = "mortar")]
#[command(version)]
#[command(propagate_version = true)]
#[command(after_help = "For more information, see: https://github.com/mortar-build/mortar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate build artifacts
    ///
    /// Reads mortar.yml (searched upward from the given directory) and
    /// regenerates every artifact that is out of date. Exits non-zero when
    /// the configuration is invalid or any artifact fails; artifacts that
    /// succeed are still written.
    ///
    /// EXAMPLES:
    ///     mortar build                   Incremental build
    ///     mortar build --force           Full rebuild
    ///     mortar build sites/docs        Build another directory
    #[command(visible_alias = "b")]
    Build {
        /// Directory to build (defaults to the current directory)
        directory: Option<PathBuf>,
        /// Rebuild everything regardless of timestamps
        #[arg(long, short = 'f')]
        force: bool,
        /// Verbose output (also lists up-to-date artifacts)
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Quiet output (errors only)
        #[arg(long, short = 'q')]
        quiet: bool,
        /// Output the run report as JSON
        #[arg(long, env = "MORTAR_JSON")]
        json: bool,
    },

    /// Scaffold a new mortar project
    ///
    /// Creates a mortar.yml with a starter package plus a source stub.
    /// Refuses to overwrite an existing configuration.
    ///
    /// EXAMPLES:
    ///     mortar init                    Initialize the current directory
    ///     mortar init sites/docs         Initialize another directory
    Init {
        /// Directory to initialize (defaults to the current directory)
        directory: Option<PathBuf>,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     mortar completions bash > /etc/bash_completion.d/mortar
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            directory,
            force,
            verbose,
            quiet,
            json,
        } => {
            let args = commands::build::BuildArgs {
                directory,
                force,
                verbose,
                quiet,
                json,
            };
            commands::build::run(args)
        }
        Commands::Init { directory } => {
            commands::init::run(&directory.unwrap_or_else(|| PathBuf::from(".")))
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}
