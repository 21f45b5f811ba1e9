//! Hack Assembler - Main Entry Point
//!
//! A two-pass assembler for the Hack assembly language.
//!
//! # Architecture
//! - **Pass 1**: Builds the symbol table by recording label positions
//! - **Pass 2**: Generates machine code, resolving all symbols
//!
//! # Usage
//! ```bash
//! assembler <input.asm> [output.hack]
//! assembler <directory> [output-directory]
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use assembler::assemble;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(Into::into)
}

fn write_output(path: &Path, instructions: &[String]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for instruction in instructions {
        writeln!(writer, "{instruction}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Assembles a single `.asm` file, writing the `.hack` result alongside it
/// (or to `explicit_output` if given).
fn assemble_file(input: &Path, explicit_output: Option<&Path>) -> Result<PathBuf> {
    let lines = read_lines(input)?;
    let instructions = assemble(&lines)?;

    let output = explicit_output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("hack"));

    write_output(&output, &instructions)?;
    Ok(output)
}

/// Assembles every `.asm` file in `dir`, skipping anything else, writing
/// each `.hack` file into `out_dir` (created if necessary).
fn assemble_directory(dir: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut outputs = Vec::new();

    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(std::result::Result::ok).collect();
    entries.sort_by_key(std::fs::DirEntry::path);

    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(std::ffi::OsStr::to_str) != Some("asm") {
            continue;
        }
        let file_name = path
            .file_stem()
            .ok_or("asm file has no stem")?
            .to_string_lossy()
            .into_owned();
        let output = out_dir.join(format!("{file_name}.hack"));
        assemble_file(&path, Some(&output))?;
        outputs.push(output);
    }

    Ok(outputs)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <input.asm|directory> [output]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} Add.asm", args[0]);
        eprintln!("  {} Add.asm Add.hack", args[0]);
        eprintln!("  {} ProjectDir ProjectDir", args[0]);
        process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let explicit_output = args.get(2).map(PathBuf::from);

    if input_path.is_dir() {
        let out_dir = explicit_output.unwrap_or_else(|| input_path.clone());
        match assemble_directory(&input_path, &out_dir) {
            Ok(outputs) => {
                for output in &outputs {
                    println!("Assembly completed. Output written to {}", output.display());
                }
            }
            Err(e) => {
                eprintln!("assembler: {e}");
                process::exit(1);
            }
        }
    } else {
        match assemble_file(&input_path, explicit_output.as_deref()) {
            Ok(output) => println!("Assembly completed. Output written to {}", output.display()),
            Err(e) => {
                eprintln!("assembler: {e}");
                process::exit(1);
            }
        }
    }

    Ok(())
}
