//! Parsing of Hack VM commands into a typed [`Command`] representation.
//!
//! Unlike a stringly-typed `command_type()`/`arg1()`/`arg2()` dispatch, every
//! command is parsed once into a tagged union with the arguments it actually
//! carries, so downstream code can `match` exhaustively instead of
//! conditionally pulling fields that may or may not apply.

use std::fmt;

/// A memory segment referenced by a `push`/`pop` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Argument,
    Local,
    Static,
    Constant,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "argument" => Some(Self::Argument),
            "local" => Some(Self::Local),
            "static" => Some(Self::Static),
            "constant" => Some(Self::Constant),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "pointer" => Some(Self::Pointer),
            "temp" => Some(Self::Temp),
            _ => None,
        }
    }
}

/// An arithmetic/logical VM command (the operand is always the stack top
/// one or two elements; never carries its own argument).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    ShiftLeft,
    ShiftRight,
}

impl ArithOp {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "sub" => Some(Self::Sub),
            "neg" => Some(Self::Neg),
            "eq" => Some(Self::Eq),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            "shiftleft" => Some(Self::ShiftLeft),
            "shiftright" => Some(Self::ShiftRight),
            _ => None,
        }
    }
}

/// A fully parsed VM command, carrying exactly the fields that command kind needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arithmetic(ArithOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

#[derive(Debug)]
pub enum ParseError {
    Io(std::io::Error),
    UnknownCommand(String),
    UnknownSegment(String),
    MissingArgument(String),
    InvalidIndex(String),
    /// `pop constant N` — `constant` has no storage to pop into, it's push-only.
    PopConstant(String),
    /// `temp`/`pointer` index outside the segment's valid range ([0,7] and
    /// {0,1} respectively).
    IndexOutOfRange { line: String, segment: Segment, index: u16 },
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::UnknownCommand(line) => write!(f, "unknown command: {line:?}"),
            Self::UnknownSegment(seg) => write!(f, "unknown segment: {seg:?}"),
            Self::MissingArgument(line) => write!(f, "missing argument(s) in: {line:?}"),
            Self::InvalidIndex(line) => write!(f, "invalid index in: {line:?}"),
            Self::PopConstant(line) => write!(f, "cannot pop into constant segment: {line:?}"),
            Self::IndexOutOfRange { line, segment, index } => write!(
                f,
                "index {index} out of range for segment {segment:?} in: {line:?}"
            ),
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Strips a `//` comment (if present) and surrounding whitespace from one
/// physical line. Returns `None` for lines that are blank after stripping.
fn strip_comment(line: &str) -> Option<&str> {
    let code = line.find("//").map_or(line, |pos| &line[..pos]);
    let trimmed = code.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_index(line: &str, raw: &str) -> Result<u16, ParseError> {
    raw.parse()
        .map_err(|_| ParseError::InvalidIndex(line.to_string()))
}

/// Validates a parsed `(segment, index)` pair against the semantic
/// constraints that no amount of successful tokenizing can catch:
/// `constant` is push-only, `temp` only spans RAM 5-12 (index 0-7), and
/// `pointer` only ever addresses `THIS`/`THAT` (index 0-1).
fn validate_segment_index(
    line: &str,
    keyword: &str,
    segment: Segment,
    index: u16,
) -> Result<(), ParseError> {
    if keyword == "pop" && segment == Segment::Constant {
        return Err(ParseError::PopConstant(line.to_string()));
    }
    let in_range = match segment {
        Segment::Temp => index <= 7,
        Segment::Pointer => index <= 1,
        _ => true,
    };
    if in_range {
        Ok(())
    } else {
        Err(ParseError::IndexOutOfRange { line: line.to_string(), segment, index })
    }
}

/// Parses one non-blank, comment-stripped VM instruction line into a [`Command`].
fn parse_line(line: &str) -> Result<Command, ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let keyword = parts[0];

    match keyword {
        "push" | "pop" => {
            let segment_str = parts
                .get(1)
                .ok_or_else(|| ParseError::MissingArgument(line.to_string()))?;
            let segment = Segment::from_str(segment_str)
                .ok_or_else(|| ParseError::UnknownSegment((*segment_str).to_string()))?;
            let index_str = parts
                .get(2)
                .ok_or_else(|| ParseError::MissingArgument(line.to_string()))?;
            let index = parse_index(line, index_str)?;
            validate_segment_index(line, keyword, segment, index)?;
            if keyword == "push" {
                Ok(Command::Push(segment, index))
            } else {
                Ok(Command::Pop(segment, index))
            }
        }
        "label" => parts
            .get(1)
            .map(|s| Command::Label((*s).to_string()))
            .ok_or_else(|| ParseError::MissingArgument(line.to_string())),
        "goto" => parts
            .get(1)
            .map(|s| Command::Goto((*s).to_string()))
            .ok_or_else(|| ParseError::MissingArgument(line.to_string())),
        "if-goto" => parts
            .get(1)
            .map(|s| Command::IfGoto((*s).to_string()))
            .ok_or_else(|| ParseError::MissingArgument(line.to_string())),
        "function" | "call" => {
            let name = parts
                .get(1)
                .ok_or_else(|| ParseError::MissingArgument(line.to_string()))?;
            let n_str = parts
                .get(2)
                .ok_or_else(|| ParseError::MissingArgument(line.to_string()))?;
            let n = parse_index(line, n_str)?;
            if keyword == "function" {
                Ok(Command::Function((*name).to_string(), n))
            } else {
                Ok(Command::Call((*name).to_string(), n))
            }
        }
        "return" => Ok(Command::Return),
        other => ArithOp::from_str(other)
            .map(Command::Arithmetic)
            .ok_or_else(|| ParseError::UnknownCommand(line.to_string())),
    }
}

/// Parses a complete `.vm` source, given as raw lines, into an ordered list
/// of commands. Comments and blank lines are dropped; everything else must
/// parse successfully or the whole file is rejected.
pub fn parse_lines(lines: &[String]) -> Result<Vec<Command>, ParseError> {
    lines
        .iter()
        .filter_map(|l| strip_comment(l))
        .map(parse_line)
        .collect()
}
