//! STOP: a small stack-and-register virtual machine
//!
//! Line-oriented assembly is assembled into a flat bytecode buffer, which
//! the VM executes or the disassembler explains.
//!
//! # Example
//!
//! ```stop
//! push 5
//! push 3
//! add
//! putn
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod frontend;
pub mod middle;
pub mod vm;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use frontend::assemble;
pub use middle::encode;
pub use vm::{decode, disassemble};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::vm::{VMConfig, VMStatus, VM};

/// Toolchain version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Toolchain name
pub const NAME: &str = "STOP stack-and-register VM";

/// Extension appended to source paths for built bytecode
pub const BYTECODE_EXTENSION: &str = "bc";

/// Assemble and encode source into bytecode
pub fn build(source: &str) -> Result<Vec<u8>> {
    let instructions = assemble(source)?;
    Ok(encode(&instructions))
}

/// Execute bytecode with the default configuration, writing to stdout
pub fn execute(program: &[u8]) -> Result<VMStatus> {
    execute_with_config(program, &VMConfig::default())
}

/// Execute bytecode with the given configuration, writing to stdout
pub fn execute_with_config(
    program: &[u8],
    config: &VMConfig,
) -> Result<VMStatus> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut vm = VM::new_with_config(config.clone());
    let status = vm.run(program, &mut out).with_context(|| match vm.fault_ip() {
        Some(ip) => format!("Execution failed at offset {:#x}", ip),
        None => "Execution failed".to_string(),
    })?;
    Ok(status)
}

/// Assemble, encode and execute source in memory
///
/// # Example
///
/// ```no_run
/// use stop::{run, Result};
///
/// fn main() -> Result<()> {
///     run("push 42\nputn\n")?;
///     Ok(())
/// }
/// ```
pub fn run(source: &str) -> Result<VMStatus> {
    debug!("run called");
    let program = build(source)?;
    execute(&program)
}

/// Default bytecode path for a source file: `<path>.bc`
pub fn bytecode_path(source_path: &Path) -> PathBuf {
    let mut name = source_path.as_os_str().to_os_string();
    name.push(".");
    name.push(BYTECODE_EXTENSION);
    PathBuf::from(name)
}

/// Build a source file into `<path>.bc`
pub fn build_file(source_path: &Path) -> Result<PathBuf> {
    let output_path = bytecode_path(source_path);
    build_file_to(source_path, &output_path)?;
    Ok(output_path)
}

/// Build a source file into an explicit output path
pub fn build_file_to(
    source_path: &Path,
    output_path: &Path,
) -> Result<()> {
    debug!(source = %source_path.display(), "build file");
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("Failed to read source: {}", source_path.display()))?;

    let program = build(&source)
        .with_context(|| format!("Failed to assemble: {}", source_path.display()))?;

    debug!(output = %output_path.display(), bytes = program.len(), "writing bytecode");
    fs::write(output_path, &program)
        .with_context(|| format!("Failed to write bytecode: {}", output_path.display()))?;
    Ok(())
}

/// Run a bytecode file, writing to stdout
pub fn run_file(
    path: &Path,
    config: &VMConfig,
) -> Result<VMStatus> {
    debug!(path = %path.display(), "run file");
    let program =
        fs::read(path).with_context(|| format!("Failed to read bytecode: {}", path.display()))?;
    execute_with_config(&program, config)
}

/// Print the disassembly of a bytecode file to stdout
pub fn explain_file(
    path: &Path,
    json: bool,
) -> Result<()> {
    debug!(path = %path.display(), json, "explain file");
    let program =
        fs::read(path).with_context(|| format!("Failed to read bytecode: {}", path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let listing = disassemble(&program);
        writeln!(out, "{}", listing.to_json()?)?;
        out.flush()?;
    } else {
        vm::explain(&program, &mut out)?;
    }
    Ok(())
}
