//! STOP - CLI

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use stop::util::config::{load_config, StopConfig};
use stop::util::logger;
use stop::vm::VMConfig;
use stop::{build_file, build_file_to, explain_file, run_file, NAME, VERSION};

/// Environment variable that enables dev mode (`STOP_DEV=1`)
const DEV_ENV: &str = "STOP_DEV";

/// Assembler, bytecode runner and disassembler for the STOP VM
#[derive(Parser, Debug)]
#[command(name = "stop")]
#[command(author = "STOP Team")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/stop/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble a source file into bytecode
    Build {
        /// Source file to assemble
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (defaults to FILE.bc)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Run a bytecode file
    Run {
        /// Bytecode file to run (source file in dev mode)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Treat FILE as source: build it first
        #[arg(long)]
        dev: bool,
    },

    /// Print the disassembly of a bytecode file
    Explain {
        /// Bytecode file to explain (source file in dev mode)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Treat FILE as source: build it first
        #[arg(long)]
        dev: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print version information
    Version,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match dispatch(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if std::io::stderr().is_terminal() {
                eprintln!("{} {:#}", "error:".red().bold(), err);
            } else {
                eprintln!("error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn dispatch(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref()).context("Failed to load config")?;
    init_logging(&config, args.verbose);

    if args.verbose {
        eprintln!("STOP version: {}", VERSION);
        eprintln!("Host: {}", std::env::consts::OS);
    }

    let vm_config = VMConfig::from(&config.vm);

    match args.command {
        Commands::Build { file, output } => {
            let output = match output {
                Some(output) => {
                    build_file_to(&file, &output)?;
                    output
                }
                None => build_file(&file)?,
            };
            tracing::info!("wrote {}", output.display());
        }
        Commands::Run { file, dev } => {
            let program = resolve_program(&file, dev)?;
            run_file(&program, &vm_config)
                .with_context(|| format!("Failed to run: {}", program.display()))?;
        }
        Commands::Explain { file, dev, json } => {
            let program = resolve_program(&file, dev)?;
            explain_file(&program, json)
                .with_context(|| format!("Failed to explain: {}", program.display()))?;
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}

fn init_logging(
    config: &StopConfig,
    verbose: bool,
) {
    logger::init_with_level(config.log_level(verbose));
}

/// Dev mode builds the source first and hands back the produced bytecode path
fn resolve_program(
    file: &Path,
    dev: bool,
) -> Result<PathBuf> {
    if dev || dev_mode_from_env() {
        build_file(file)
    } else {
        Ok(file.to_path_buf())
    }
}

fn dev_mode_from_env() -> bool {
    std::env::var(DEV_ENV).map(|v| v == "1").unwrap_or(false)
}
