//! Build command - generate artifacts for every target and profile

use anyhow::{Context, Result};
use colored::Colorize;
use mortar_build::{BuildEvent, Project, RunReport};
use std::path::PathBuf;

/// Build command arguments
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    /// Directory to build (defaults to the current directory)
    pub directory: Option<PathBuf>,
    /// Rebuild everything regardless of timestamps
    pub force: bool,
    /// Verbose output
    pub verbose: bool,
    /// Quiet output (errors only)
    pub quiet: bool,
    /// JSON output
    pub json: bool,
}

/// Output verbosity for the build command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Normal,
    Verbose,
    Quiet,
    Json,
}

/// Run the build command
pub fn run(args: BuildArgs) -> Result<()> {
    let directory = args.directory.clone().unwrap_or_else(|| PathBuf::from("."));
    let mode = determine_output_mode(&args);

    let mut project =
        Project::from_directory(&directory).context("Failed to load build configuration")?;

    if args.force {
        project.force();
    }

    if matches!(mode, OutputMode::Normal | OutputMode::Verbose) {
        project.subscribe(move |event| print_event(event, mode));
    }

    let report = project.run();
    render_report(&report, mode);

    if !report.success() {
        anyhow::bail!("{} artifact(s) failed", report.failures.len());
    }
    Ok(())
}

/// Determine output mode from arguments
fn determine_output_mode(args: &BuildArgs) -> OutputMode {
    if args.json {
        OutputMode::Json
    } else if args.quiet {
        OutputMode::Quiet
    } else if args.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    }
}

/// Print one progress line per artifact as events fire
fn print_event(event: &BuildEvent, mode: OutputMode) {
    match event {
        BuildEvent::FileCreated { profile, path, .. } => {
            println!(
                "  {} {} ({})",
                "Created".green().bold(),
                path.display(),
                profile
            );
        }
        BuildEvent::FileNotChanged { profile, path, .. } => {
            if mode == OutputMode::Verbose {
                println!(
                    "  {} {} ({})",
                    "Unchanged".dimmed(),
                    path.display(),
                    profile
                );
            }
        }
        BuildEvent::BuildComplete => {}
    }
}

/// Render the end-of-run report
fn render_report(report: &RunReport, mode: OutputMode) {
    match mode {
        OutputMode::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "success": report.success(),
                    "written": report.written,
                    "skipped": report.skipped.len(),
                    "failures": report.failures,
                })
            );
        }
        OutputMode::Quiet => {
            for failure in &report.failures {
                eprintln!(
                    "{} {} ({}): {}",
                    "error:".red().bold(),
                    failure.target,
                    failure.profile,
                    failure.error
                );
            }
        }
        OutputMode::Normal | OutputMode::Verbose => {
            println!(
                "\n{} written, {} up to date",
                report.written.len(),
                report.skipped.len()
            );
            for failure in &report.failures {
                eprintln!(
                    "{} {} ({}): {}",
                    "error:".red().bold(),
                    failure.target,
                    failure.profile,
                    failure.error
                );
            }
        }
    }
}
