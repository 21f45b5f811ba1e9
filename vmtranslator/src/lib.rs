//! VM translator for the Hack platform
//!
//! Translates Hack VM (stack-machine intermediate representation) programs
//! into Hack assembly, implementing the full calling convention (`call`/
//! `function`/`return`), program control (`label`/`goto`/`if-goto`), and
//! overflow-safe comparison operators.
//!
//! # Architecture
//!
//! - [`parser`]: parses `.vm` source lines into a typed [`parser::Command`] stream
//! - [`code_writer`]: translates each [`parser::Command`] into Hack assembly text
//!
//! # Example
//!
//! ```rust
//! use vmtranslator::{parser, code_writer::CodeWriter};
//!
//! let lines = vec!["push constant 7".to_string(), "push constant 8".to_string(), "add".to_string()];
//! let commands = parser::parse_lines(&lines).unwrap();
//!
//! let mut buf = Vec::new();
//! let mut writer = CodeWriter::new(&mut buf);
//! writer.set_file_name("Example");
//! for command in &commands {
//!     writer.write_command(command).unwrap();
//! }
//! writer.flush().unwrap();
//! let asm = String::from_utf8(buf).unwrap();
//! assert!(asm.contains("D+M"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod code_writer;
pub mod parser;

pub use parser::{ArithOp, Command, ParseError, Segment};

/// True if `function Sys.init` appears (as the first token, ignoring
/// comments/whitespace) anywhere in `lines`.
#[must_use]
pub fn defines_sys_init(lines: &[String]) -> bool {
    lines.iter().any(|line| {
        let code = line.find("//").map_or(line.as_str(), |pos| &line[..pos]);
        code.trim().starts_with("function Sys.init")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defines_sys_init_detects_declaration() {
        let lines = vec!["function Sys.init 0".to_string(), "push constant 0".to_string()];
        assert!(defines_sys_init(&lines));
    }

    #[test]
    fn test_defines_sys_init_ignores_comments() {
        let lines = vec!["// function Sys.init 0".to_string()];
        assert!(!defines_sys_init(&lines));
    }

    #[test]
    fn test_defines_sys_init_absent() {
        let lines = vec!["function Main.main 0".to_string()];
        assert!(!defines_sys_init(&lines));
    }
}
