//! Hack Assembler for the `Nand2Tetris` course
//!
//! This crate provides a two-pass assembler that translates Hack assembly
//! language into Hack machine code (16-bit binary text).
//!
//! # Architecture
//!
//! - [`parser`]: Zero-copy parsing of assembly instructions
//! - [`code`]: Binary encoding using perfect hash functions (PHF)
//! - [`symbol_table`]: Symbol management with predefined symbols
//! - [`assemble`]: ties the above into the documented two-pass algorithm
//!
//! # Example
//!
//! ```rust
//! use assembler::{ParserLines, CommandType, SymbolTable, code};
//!
//! let lines = vec!["@100".to_string(), "D=M".to_string()];
//! let mut parser = ParserLines::from_lines(&lines);
//!
//! parser.advance();
//! assert_eq!(parser.command_type().unwrap(), CommandType::ACommand);
//! assert_eq!(parser.symbol().unwrap(), "100");
//!
//! parser.advance();
//! assert_eq!(parser.command_type().unwrap(), CommandType::CCommand);
//! let instruction = code::encode_c_instruction("D", "M", "");
//! assert_eq!(instruction, "1111110000010000");
//!
//! let mut symbols = SymbolTable::new();
//! symbols.add_entry("LOOP", 10);
//! assert_eq!(symbols.get_address("LOOP"), 10);
//! assert_eq!(symbols.get_address("SP"), 0); // Predefined symbol
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::inline_always,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod code;
pub mod parser;
pub mod symbol_table;

use std::fmt;

pub use parser::{CommandType, ParserError, ParserLines};
pub use symbol_table::SymbolTable;

/// Errors that can abort assembly of a single `.asm` translation unit.
#[derive(Debug)]
pub enum AssemblerError {
    /// Propagated from the line-level parser (malformed instruction shape).
    Parse(ParserError),
    /// A dest/comp/jump mnemonic isn't in the encoding tables.
    UnknownMnemonic {
        kind: &'static str,
        mnemonic: String,
    },
    /// An L-command symbol is bound twice to different addresses would be
    /// a parser bug, not a user error, so this variant is reserved for I/O.
    Io(std::io::Error),
}

impl std::error::Error for AssemblerError {}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::UnknownMnemonic { kind, mnemonic } => {
                write!(f, "unknown {kind} mnemonic: {mnemonic:?}")
            }
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl From<ParserError> for AssemblerError {
    fn from(e: ParserError) -> Self {
        Self::Parse(e)
    }
}

impl From<std::io::Error> for AssemblerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Runs pass 1 (label binding) over `lines`, returning the populated symbol table.
///
/// Walks commands in order, maintaining a running ROM address starting at 0.
/// A/C-commands increment the address; L-commands bind their symbol to the
/// *next* instruction's address without incrementing.
pub fn first_pass(lines: &[String]) -> Result<SymbolTable, AssemblerError> {
    let mut symbol_table = SymbolTable::new();
    let mut rom_address = 0u16;
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        match parser.command_type()? {
            CommandType::LCommand => {
                let symbol = parser.symbol()?;
                symbol_table.add_entry(symbol, rom_address);
            }
            CommandType::ACommand | CommandType::CCommand => {
                rom_address += 1;
            }
        }
    }

    Ok(symbol_table)
}

/// Runs pass 2 (emission) over `lines`, returning one 16-character binary
/// string per real instruction (L-commands produce no output).
///
/// Free variables are allocated sequentially starting at RAM address 16,
/// in first-seen order, via [`SymbolTable::get_or_insert`].
pub fn second_pass(
    lines: &[String],
    symbol_table: &mut SymbolTable,
) -> Result<Vec<String>, AssemblerError> {
    let mut output = Vec::with_capacity(lines.len());
    let mut ram_address = 16u16;
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        match parser.command_type()? {
            CommandType::ACommand => {
                let symbol = parser.symbol()?;
                let address = symbol
                    .parse::<u16>()
                    .unwrap_or_else(|_| symbol_table.get_or_insert(symbol, &mut ram_address));
                output.push(code::encode_a_instruction(address));
            }
            CommandType::CCommand => {
                let dest = parser.dest()?.unwrap_or("");
                let comp = parser.comp()?.unwrap_or("");
                let jump = parser.jump()?.unwrap_or("");

                let (dest_ok, comp_ok, jump_ok) = code::validate_mnemonics(dest, comp, jump);
                if !comp_ok {
                    return Err(AssemblerError::UnknownMnemonic {
                        kind: "comp",
                        mnemonic: comp.to_string(),
                    });
                }
                if !dest_ok {
                    return Err(AssemblerError::UnknownMnemonic {
                        kind: "dest",
                        mnemonic: dest.to_string(),
                    });
                }
                if !jump_ok {
                    return Err(AssemblerError::UnknownMnemonic {
                        kind: "jump",
                        mnemonic: jump.to_string(),
                    });
                }

                output.push(code::encode_c_instruction(dest, comp, jump));
            }
            CommandType::LCommand => {}
        }
    }

    Ok(output)
}

/// Assembles a complete `.asm` source (given as a slice of lines) into Hack
/// binary text lines. This is the full two-pass algorithm: pass 1 binds
/// labels, pass 2 resolves symbols (allocating free variables) and emits.
pub fn assemble(lines: &[String]) -> Result<Vec<String>, AssemblerError> {
    let mut symbol_table = first_pass(lines)?;
    second_pass(lines, &mut symbol_table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_assembly_workflow() {
        let lines = vec![
            "@2".to_string(),
            "D=A".to_string(),
            "@3".to_string(),
            "D=D+A".to_string(),
            "@0".to_string(),
            "M=D".to_string(),
        ];

        let mut parser = ParserLines::from_lines(&lines);
        let mut instructions = Vec::new();

        while parser.advance() {
            match parser.command_type().unwrap() {
                CommandType::ACommand => {
                    let symbol = parser.symbol().unwrap();
                    let addr = symbol.parse::<u16>().unwrap();
                    instructions.push(code::encode_a_instruction(addr));
                }
                CommandType::CCommand => {
                    let instruction = code::encode_c_instruction(
                        parser.dest().unwrap().unwrap_or(""),
                        parser.comp().unwrap().unwrap_or(""),
                        parser.jump().unwrap().unwrap_or(""),
                    );
                    instructions.push(instruction);
                }
                CommandType::LCommand => {}
            }
        }

        assert_eq!(instructions.len(), 6);
        assert_eq!(instructions[0], "0000000000000010"); // @2
        assert_eq!(instructions[1], "1110110000010000"); // D=A
    }

    #[test]
    fn test_symbol_table_integration() {
        let mut st = SymbolTable::new();
        let mut next_addr = 16;

        assert_eq!(st.get_address("SP"), 0);
        assert_eq!(st.get_address("R15"), 15);
        assert_eq!(st.get_address("SCREEN"), 16384);

        let var1 = st.get_or_insert("i", &mut next_addr);
        assert_eq!(var1, 16);
        assert_eq!(next_addr, 17);

        let var1_again = st.get_or_insert("i", &mut next_addr);
        assert_eq!(var1_again, 16);
        assert_eq!(next_addr, 17);
    }

    /// Spec §8 scenario (a): labels bind to the instruction *after* them,
    /// variables allocate from 16 upward in first-seen order.
    #[test]
    fn test_spec_scenario_a() {
        let lines = vec![
            "@17".to_string(),
            "D=A".to_string(),
            "@sum".to_string(),
            "M=D".to_string(),
            "(LOOP)".to_string(),
            "@LOOP".to_string(),
            "0;JMP".to_string(),
        ];

        let output = assemble(&lines).unwrap();
        assert_eq!(
            output,
            vec![
                "0000000000010001", // @17
                "1110110000010000", // D=A
                "0000000000010000", // @sum -> 16
                "1110001100001000", // M=D
                "0000000000000100", // @LOOP -> 4
                "1110101010000111", // 0;JMP
            ]
        );
    }

    #[test]
    fn test_unknown_comp_mnemonic_is_reported() {
        let lines = vec!["D=FROB".to_string()];
        let err = assemble(&lines).unwrap_err();
        assert!(matches!(
            err,
            AssemblerError::UnknownMnemonic { kind: "comp", .. }
        ));
    }

    #[test]
    fn test_shift_instruction_assembles_with_101_prefix() {
        let lines = vec!["D=D<<".to_string()];
        let output = assemble(&lines).unwrap();
        assert_eq!(&output[0][0..3], "101");
    }

    #[test]
    fn test_assembler_determinism() {
        let lines = vec![
            "@100".to_string(),
            "D=A".to_string(),
            "@var".to_string(),
            "M=D".to_string(),
        ];
        let first = assemble(&lines).unwrap();
        let second = assemble(&lines).unwrap();
        assert_eq!(first, second);
    }
}
