//! Jack Compiler - Main Entry Point
//!
//! Translates Jack source directly into Hack VM code, one `.vm` file per
//! `.jack` file, with no intermediate parse tree or XML output.
//!
//! # Usage
//! ```bash
//! jackc <input.jack|directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};
use std::process;

use jackc::CompilationEngine;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn read_source(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut source = String::new();
    file.read_to_string(&mut source)?;
    Ok(source)
}

/// Compiles a single `.jack` file, writing the `.vm` result alongside it.
fn compile_file(input: &Path) -> Result<PathBuf> {
    let source = read_source(input)?;
    let output = input.with_extension("vm");
    let file = File::create(&output)?;
    let mut writer = BufWriter::new(file);
    CompilationEngine::compile(&source, &mut writer)?;
    Ok(output)
}

/// Compiles every `.jack` file in `dir`, skipping anything else.
fn compile_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut outputs = Vec::new();

    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(std::result::Result::ok).collect();
    entries.sort_by_key(std::fs::DirEntry::path);

    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(std::ffi::OsStr::to_str) != Some("jack") {
            continue;
        }
        outputs.push(compile_file(&path)?);
    }

    Ok(outputs)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack|directory>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} Main.jack", args[0]);
        eprintln!("  {} ProjectDir", args[0]);
        process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);

    let result = if input_path.is_dir() {
        compile_directory(&input_path)
    } else {
        compile_file(&input_path).map(|p| vec![p])
    };

    match result {
        Ok(outputs) => {
            for output in &outputs {
                println!("Compilation completed. Output written to {}", output.display());
            }
        }
        Err(e) => {
            eprintln!("jackc: {e}");
            process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_file_output_extension() {
        let p = Path::new("Main.jack");
        assert_eq!(p.with_extension("vm"), PathBuf::from("Main.vm"));
    }

    #[test]
    fn test_compile_file_preserves_directory() {
        let p = Path::new("dir/Main.jack");
        assert_eq!(p.with_extension("vm"), PathBuf::from("dir/Main.vm"));
    }
}
