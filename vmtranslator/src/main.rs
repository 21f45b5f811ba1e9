//! VM Translator - Main Entry Point
//!
//! Translates Hack VM code (`.vm`) into Hack assembly (`.asm`).
//!
//! # Usage
//! ```bash
//! vmtranslator <input.vm>
//! vmtranslator <directory>
//! ```
//!
//! A single file translates to a same-named `.asm` file. A directory
//! translates every `.vm` file it contains (in name order) into one
//! `.asm` file named after the directory. Bootstrap code (`SP=256; call
//! Sys.init 0`) is emitted first whenever any input file declares
//! `function Sys.init`.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use vmtranslator::code_writer::CodeWriter;
use vmtranslator::{defines_sys_init, parser};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(Into::into)
}

fn collect_vm_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(std::ffi::OsStr::to_str) == Some("vm"))
        .collect();
    files.sort();
    Ok(files)
}

fn output_path_for(input: &Path) -> Result<PathBuf> {
    if input.is_dir() {
        let dir_name = input
            .file_name()
            .ok_or("directory has no name")?
            .to_string_lossy()
            .into_owned();
        Ok(input.join(format!("{dir_name}.asm")))
    } else {
        Ok(input.with_extension("asm"))
    }
}

fn translate_one(writer: &mut CodeWriter<BufWriter<File>>, path: &Path) -> Result<()> {
    let lines = read_lines(path)?;
    let stem = path
        .file_stem()
        .ok_or("vm file has no stem")?
        .to_string_lossy()
        .into_owned();
    writer.set_file_name(&stem);

    let commands = parser::parse_lines(&lines)?;
    for command in &commands {
        writer.write_command(command)?;
    }
    Ok(())
}

fn run(input: &Path) -> Result<PathBuf> {
    let vm_files = if input.is_dir() {
        collect_vm_files(input)?
    } else {
        vec![input.to_path_buf()]
    };

    if vm_files.is_empty() {
        return Err(format!("no .vm files found under {}", input.display()).into());
    }

    let include_bootstrap = {
        let mut any = false;
        for path in &vm_files {
            if defines_sys_init(&read_lines(path)?) {
                any = true;
                break;
            }
        }
        any
    };

    let output = output_path_for(input)?;
    let out_file = File::create(&output)?;
    let mut writer = CodeWriter::new(BufWriter::new(out_file));

    if include_bootstrap {
        writer.write_init()?;
    }

    for path in &vm_files {
        translate_one(&mut writer, path)?;
    }

    writer.flush()?;
    Ok(output)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm|directory>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} Max.vm", args[0]);
        eprintln!("  {} FunctionCalls", args[0]);
        process::exit(1);
    }

    let input = PathBuf::from(&args[1]);
    match run(&input) {
        Ok(output) => {
            println!("Translation complete: {} -> {}", input.display(), output.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("vmtranslator: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for_file() {
        let p = Path::new("Max.vm");
        assert_eq!(output_path_for(p).unwrap(), PathBuf::from("Max.asm"));
    }
}
