//! CLI entry point for paignion_script.
//! Usage: cargo run -p paignion_script -- compile my_game --out game.json

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::info;
use paignion_data::{GameData, validate_game};
use paignion_script::compile_project;

#[derive(Parser)]
#[command(author, version, about = "Compile Paignion room files into game data.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a project's rooms to JSON game data.
    Compile(CompileArgs),
    /// Compile a project and report lints without writing any output.
    Lint(LintArgs),
}

#[derive(Args)]
struct CompileArgs {
    /// Project directory containing `rooms/`.
    project_dir: PathBuf,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Indent the JSON output.
    #[arg(long)]
    pretty: bool,
    /// Fail when any lint is reported.
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(Args)]
struct LintArgs {
    /// Project directory containing `rooms/`.
    project_dir: PathBuf,
    /// Fail when any lint is reported.
    #[arg(long)]
    deny_warnings: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Compile(args) => run_compile(&args),
        Commands::Lint(args) => run_lint(&args),
    }
}

fn run_compile(args: &CompileArgs) -> Result<()> {
    let game = build(&args.project_dir)?;
    let lints = report_lints(&game);

    let json = if args.pretty {
        serde_json::to_string_pretty(&game)
    } else {
        serde_json::to_string(&game)
    }
    .context("serializing game data")?;

    match &args.out {
        Some(path) => {
            fs::write(path, json.as_bytes()).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote game data to {}", path.display());
        },
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("writing game data to stdout")?;
        },
    }

    deny_if(args.deny_warnings, lints)
}

fn run_lint(args: &LintArgs) -> Result<()> {
    let game = build(&args.project_dir)?;
    let lints = report_lints(&game);
    if lints == 0 {
        println!("{}: no problems found", args.project_dir.display());
    }
    deny_if(args.deny_warnings, lints)
}

fn build(project_dir: &Path) -> Result<GameData> {
    info!("compiling project at {}", project_dir.display());
    compile_project(project_dir).with_context(|| format!("while compiling {}", project_dir.display()))
}

/// Print every lint to stderr and return how many there were.
fn report_lints(game: &GameData) -> usize {
    let lints = validate_game(game);
    for lint in &lints {
        eprintln!("warning: {lint}");
    }
    lints.len()
}

fn deny_if(deny: bool, lints: usize) -> Result<()> {
    if deny && lints > 0 {
        bail!("{lints} lint(s) reported and --deny-warnings is set");
    }
    Ok(())
}
