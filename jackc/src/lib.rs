//! Jack language compiler: translates `.jack` source files directly into
//! Hack VM code (`.vm`), the format consumed by the vmtranslator crate.
//!
//! ```
//! use jackc::compilation_engine::CompilationEngine;
//!
//! let source = "class Main { function void main() { return; } }";
//! let mut out = Vec::new();
//! CompilationEngine::compile(source, &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("function Main.main 0"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compilation_engine;
pub mod symbol_table;
pub mod tokenizer;
pub mod vm_writer;

pub use compilation_engine::{CompilationEngine, CompileError};
pub use tokenizer::{Token, Tokenizer, TokenizerError};
