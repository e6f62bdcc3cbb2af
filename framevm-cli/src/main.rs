//! framevm CLI: run, check and disassemble framevm programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1-49: Status requested by the program's EXIT instruction
//! - 50-99: Program error, numbered by the selected exit-code policy
//! - 64: Usage error
//! - 66: Source or input file cannot be read

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use framevm_common::ExitCodes;
use framevm_vm::{
    VmConfig, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_DATA_STACK, DEFAULT_MAX_LOCAL_FRAMES,
};
use tracing_subscriber::EnvFilter;

use commands::{RunOptions, EX_USAGE};

/// Exit-code policy selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ExitCodesArg {
    /// One code per error class
    #[default]
    Classic,
    /// Separate codes for undefined variables, missing frames and string errors
    Detailed,
}

impl From<ExitCodesArg> for ExitCodes {
    fn from(arg: ExitCodesArg) -> Self {
        match arg {
            ExitCodesArg::Classic => ExitCodes::classic(),
            ExitCodesArg::Detailed => ExitCodes::detailed(),
        }
    }
}

#[derive(Parser)]
#[command(name = "framevm")]
#[command(about = "Interpreter for the framevm instruction set", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and execute a program
    Run {
        /// Program source, assembly text or XML (defaults to stdin)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Input lines for READ (defaults to stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Exit-code policy for program errors
        #[arg(long, value_enum, default_value = "classic")]
        exit_codes: ExitCodesArg,

        /// Maximum number of nested CALLs
        #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
        max_call_depth: usize,

        /// Maximum number of values on the data stack
        #[arg(long, default_value_t = DEFAULT_MAX_DATA_STACK)]
        max_data_stack: usize,

        /// Maximum number of local frames
        #[arg(long, default_value_t = DEFAULT_MAX_LOCAL_FRAMES)]
        max_local_frames: usize,
    },
    /// Load a program and build its label table without running it
    Check {
        /// Program source, assembly text or XML
        #[arg(long)]
        source: PathBuf,
    },
    /// Print a program in canonical assembly form
    Disassemble {
        /// Program source, assembly text or XML
        #[arg(long)]
        source: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FRAMEVM_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors.
            let code = if e.use_stderr() { EX_USAGE } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let result = match cli.command {
        Commands::Run {
            source,
            input,
            exit_codes,
            max_call_depth,
            max_data_stack,
            max_local_frames,
        } => commands::run(RunOptions {
            source,
            input,
            codes: exit_codes.into(),
            config: VmConfig {
                max_call_depth,
                max_data_stack,
                max_local_frames,
            },
        }),
        Commands::Check { source } => commands::check(&source),
        Commands::Disassemble { source } => commands::disassemble(&source),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
