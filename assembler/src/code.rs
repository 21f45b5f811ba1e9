//! Code generation module for Hack assembly language
//!
//! Translates assembly mnemonics to binary machine code using perfect hash functions (PHF).
//! PHF provides O(1) lookup with zero runtime overhead - the hash table is computed at compile time.
//!
//! # Performance
//! - All lookups use PHF maps: O(1) compile-time perfect hashing
//! - String formatting uses standard library (optimized by LLVM)
//! - Hot paths are inlined for better performance

use phf::phf_map;

/// Destination mnemonic to binary code mapping (3 bits)
///
/// Maps destination mnemonics to their 3-bit binary representation.
/// Empty string represents null destination.
static DEST_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "M" => "001",
    "D" => "010",
    "MD" => "011",
    "A" => "100",
    "AM" => "101",
    "AD" => "110",
    "AMD" => "111",
};

/// Computation mnemonic to binary code mapping (7 bits)
///
/// Includes both a=0 (A register) and a=1 (M register) variants, plus the
/// six shift-op variants. Shift comps are encoded with the same 7-bit field
/// width as standard ALU comps; the leading instruction-type bit (prefix)
/// distinguishes them and is *not* part of this map — see [`comp_prefix`].
static COMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    // a=0 (A register operations)
    "0" => "0101010",
    "1" => "0111111",
    "-1" => "0111010",
    "D" => "0001100",
    "A" => "0110000",
    "!D" => "0001101",
    "!A" => "0110001",
    "-D" => "0001111",
    "-A" => "0110011",
    "D+1" => "0011111",
    "A+1" => "0110111",
    "D-1" => "0001110",
    "A-1" => "0110010",
    "D+A" => "0000010",
    "D-A" => "0010011",
    "A-D" => "0000111",
    "D&A" => "0000000",
    "D|A" => "0010101",

    // a=1 (M register operations)
    "M" => "1110000",
    "!M" => "1110001",
    "-M" => "1110011",
    "M+1" => "1110111",
    "M-1" => "1110010",
    "D+M" => "1000010",
    "D-M" => "1010011",
    "M-D" => "1000111",
    "D&M" => "1000000",
    "D|M" => "1010101",

    // shift operations (see §4.1: these always use the "101" instruction
    // prefix, never the "111" prefix with a hardcoded dest field)
    "A<<" => "0100000",
    "D<<" => "0110000",
    "M<<" => "1100000",
    "A>>" => "0000000",
    "D>>" => "0010000",
    "M>>" => "1000000",
};

/// Computations whose instruction carries the `101` prefix instead of `111`.
///
/// Per spec: shift comps change the leading instruction-type bits from
/// `111` to `101`; the 7-bit comp field is otherwise looked up exactly like
/// any other comp mnemonic. A prior (buggy) implementation hardcoded the
/// dest field to `010` for shifts — that bug is not reproduced here; dest
/// is always computed normally via [`dest`].
static SHIFT_COMPS: phf::Map<&'static str, ()> = phf_map! {
    "A<<" => (),
    "D<<" => (),
    "M<<" => (),
    "A>>" => (),
    "D>>" => (),
    "M>>" => (),
};

/// Jump mnemonic to binary code mapping (3 bits)
///
/// Maps jump mnemonics to their 3-bit binary representation.
/// Empty string represents no jump.
static JUMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "JGT" => "001",
    "JEQ" => "010",
    "JGE" => "011",
    "JLT" => "100",
    "JNE" => "101",
    "JLE" => "110",
    "JMP" => "111",
};

/// Default values for missing mnemonics
const DEFAULT_DEST: &str = "000";
const DEFAULT_COMP: &str = "0101010"; // Computes 0
const DEFAULT_JUMP: &str = "000";

/// Translates a destination mnemonic to its binary code
///
/// # Returns
/// 3-bit binary string, or "000" if mnemonic is invalid
#[inline]
#[must_use]
pub fn dest(mnemonic: &str) -> &'static str {
    DEST_MAP.get(mnemonic).copied().unwrap_or(DEFAULT_DEST)
}

/// Translates a computation mnemonic to its binary code
///
/// # Returns
/// 7-bit binary string, or "0101010" (computes 0) if mnemonic is invalid
#[inline]
#[must_use]
pub fn comp(mnemonic: &str) -> &'static str {
    COMP_MAP.get(mnemonic).copied().unwrap_or(DEFAULT_COMP)
}

/// Translates a jump mnemonic to its binary code
///
/// # Returns
/// 3-bit binary string, or "000" (no jump) if mnemonic is invalid
#[inline]
#[must_use]
pub fn jump(mnemonic: &str) -> &'static str {
    JUMP_MAP.get(mnemonic).copied().unwrap_or(DEFAULT_JUMP)
}

/// Returns the 3-bit instruction-type prefix for a comp mnemonic: `101` for
/// the six shift operations, `111` for everything else (including unknown
/// mnemonics, which fall back to the standard-ALU prefix).
#[inline]
#[must_use]
pub fn comp_prefix(mnemonic: &str) -> &'static str {
    if SHIFT_COMPS.contains_key(mnemonic) {
        "101"
    } else {
        "111"
    }
}

/// Checks whether `mnemonic` is a recognized comp mnemonic (standard or shift).
#[inline]
#[must_use]
pub fn is_known_comp(mnemonic: &str) -> bool {
    COMP_MAP.contains_key(mnemonic)
}

/// Encodes a complete C-instruction
///
/// C-instruction format: `{prefix}{comp}{dest}{jump}` (16 bits), where
/// `prefix` is `111` for standard ALU ops or `101` for shift ops.
///
/// # Example
/// ```
/// use assembler::code::encode_c_instruction;
/// let instruction = encode_c_instruction("D", "D+1", "");
/// assert_eq!(instruction, "1110011111010000");
/// ```
#[inline]
#[must_use]
pub fn encode_c_instruction(
    dest_mnemonic: &str,
    comp_mnemonic: &str,
    jump_mnemonic: &str,
) -> String {
    format!(
        "{}{}{}{}",
        comp_prefix(comp_mnemonic),
        comp(comp_mnemonic),
        dest(dest_mnemonic),
        jump(jump_mnemonic)
    )
}

/// Encodes an A-instruction
///
/// A-instruction format: 0vvvvvvvvvvvvvvv (16 bits)
///
/// # Example
/// ```
/// use assembler::code::encode_a_instruction;
/// let instruction = encode_a_instruction(100);
/// assert_eq!(instruction, "0000000001100100");
/// ```
#[inline]
#[must_use]
pub fn encode_a_instruction(address: u16) -> String {
    format!("{address:016b}")
}

/// Validates mnemonics for all three parts of a C-instruction
///
/// # Returns
/// Tuple of (`dest_valid`, `comp_valid`, `jump_valid`)
#[inline]
#[must_use]
pub fn validate_mnemonics(
    dest_mnemonic: &str,
    comp_mnemonic: &str,
    jump_mnemonic: &str,
) -> (bool, bool, bool) {
    (
        DEST_MAP.contains_key(dest_mnemonic),
        is_known_comp(comp_mnemonic),
        JUMP_MAP.contains_key(jump_mnemonic),
    )
}
