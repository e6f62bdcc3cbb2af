//! CLI command implementations.
//!
//! Each command reports its own diagnostics on stderr and returns the
//! process exit code on failure.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use framevm_common::{Diagnosed, ExitCodes, Program};
use framevm_vm::{BufReadSource, Io, LabelTable, LineSource, Outcome, VmConfig};
use tracing::debug;

/// Command-line usage error (sysexits `EX_USAGE`).
pub const EX_USAGE: i32 = 64;
/// Source or input file cannot be opened (sysexits `EX_NOINPUT`).
pub const EX_NOINPUT: i32 = 66;

pub struct RunOptions {
    pub source: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub codes: ExitCodes,
    pub config: VmConfig,
}

/// Load and execute a program.
pub fn run(opts: RunOptions) -> Result<(), i32> {
    let RunOptions {
        source,
        input,
        codes,
        config,
    } = opts;

    if source.is_none() && input.is_none() {
        eprintln!("error: at least one of --source and --input is required");
        eprintln!("Usage: framevm run [--source FILE] [--input FILE]");
        return Err(EX_USAGE);
    }

    let text = match &source {
        Some(path) => read_file(path)?,
        None => read_stdin()?,
    };
    let program = load(&text, &codes)?;

    let stdin = io::stdin();
    let mut lines: Box<dyn LineSource> = match &input {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                eprintln!("error: cannot read '{}': {e}", path.display());
                EX_NOINPUT
            })?;
            Box::new(BufReadSource::new(BufReader::new(file)))
        }
        None => Box::new(BufReadSource::new(stdin.lock())),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let stderr = io::stderr();
    let mut diag = stderr.lock();

    let result = framevm_vm::run_with(
        &program,
        Io::new(lines.as_mut(), &mut out, &mut diag),
        config,
    );
    let flushed = out.flush();
    drop(diag);

    if let Err(e) = flushed {
        eprintln!("error: output failed: {e}");
        return Err(codes.internal.into());
    }

    match result {
        Ok(Outcome::Completed) | Ok(Outcome::Exited(0)) => Ok(()),
        Ok(Outcome::Exited(code)) => Err(code.into()),
        Err(e) => Err(report(&e, &codes)),
    }
}

/// Load a program and build its label table.
pub fn check(source: &Path) -> Result<(), i32> {
    let codes = ExitCodes::default();
    let text = read_file(source)?;
    let program = load(&text, &codes)?;

    let labels = LabelTable::build(&program).map_err(|e| report(&e, &codes))?;

    println!(
        "OK: {} instructions, {} labels",
        program.len(),
        labels.len()
    );
    Ok(())
}

/// Print a program in canonical form.
pub fn disassemble(source: &Path) -> Result<(), i32> {
    let text = read_file(source)?;
    let program = load(&text, &ExitCodes::default())?;
    print!("{}", framevm_assembler::disassemble(&program));
    Ok(())
}

// ---- Helpers ----

fn load(text: &str, codes: &ExitCodes) -> Result<Program, i32> {
    let xml = framevm_assembler::is_xml(text);
    let program = framevm_assembler::load(text).map_err(|e| report(&e, codes))?;
    debug!(instructions = program.len(), xml, "program loaded");
    Ok(program)
}

/// Print an error and return its exit code under `codes`.
fn report(err: &(impl Diagnosed + Display), codes: &ExitCodes) -> i32 {
    eprintln!("error: {err}");
    codes.code_for(err).into()
}

fn read_file(path: &Path) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        EX_NOINPUT
    })
}

fn read_stdin() -> Result<String, i32> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text).map_err(|e| {
        eprintln!("error: cannot read program from stdin: {e}");
        EX_NOINPUT
    })?;
    Ok(text)
}
