//! Lexical analysis of Jack source into a token stream.
//!
//! Tokenizes eagerly into an indexable buffer (rather than a pull-based
//! stream) so the compiler can look two tokens ahead without backtracking
//! tricks — distinguishing a bare variable reference from `var[expr]`,
//! `Cls.sub()`, `obj.sub()` and `sub()` all need to peek past the current
//! identifier before committing to a grammar production.

use phf::phf_map;
use std::fmt;

/// The 21 reserved words of the Jack language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "class" => Keyword::Class,
    "constructor" => Keyword::Constructor,
    "function" => Keyword::Function,
    "method" => Keyword::Method,
    "field" => Keyword::Field,
    "static" => Keyword::Static,
    "var" => Keyword::Var,
    "int" => Keyword::Int,
    "char" => Keyword::Char,
    "boolean" => Keyword::Boolean,
    "void" => Keyword::Void,
    "true" => Keyword::True,
    "false" => Keyword::False,
    "null" => Keyword::Null,
    "this" => Keyword::This,
    "let" => Keyword::Let,
    "do" => Keyword::Do,
    "if" => Keyword::If,
    "else" => Keyword::Else,
    "while" => Keyword::While,
    "return" => Keyword::Return,
};

/// The 19 single-character symbols of the Jack grammar.
const SYMBOLS: &str = "{}()[].,;+-*/&|<>=~";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Keyword(Keyword),
    Symbol(char),
    IntConst(i16),
    StringConst(String),
    Identifier(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "{k:?}"),
            Self::Symbol(c) => write!(f, "{c}"),
            Self::IntConst(n) => write!(f, "{n}"),
            Self::StringConst(s) => write!(f, "{s:?}"),
            Self::Identifier(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug)]
pub enum TokenizerError {
    UnterminatedString,
    IntConstOutOfRange(String),
}

impl std::error::Error for TokenizerError {}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string constant"),
            Self::IntConstOutOfRange(s) => write!(f, "integer constant out of range: {s}"),
        }
    }
}

/// Strips `//` and `/* ... */` comments, leaving string literal contents
/// untouched (a `//` or `/*` inside a `"..."` is not a comment).
fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    let mut in_string = false;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c == '"' {
            in_string = !in_string;
            out.push(c);
            i += 1;
            continue;
        }

        if !in_string {
            if bytes[i..].starts_with(b"//") {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            if bytes[i..].starts_with(b"/*") {
                i += 2;
                while i + 1 < bytes.len() && !bytes[i..].starts_with(b"*/") {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                continue;
            }
        }

        out.push(c);
        i += 1;
    }

    out
}

fn tokenize(source: &str) -> Result<Vec<Token>, TokenizerError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if SYMBOLS.contains(c) {
            tokens.push(Token::Symbol(c));
            i += 1;
            continue;
        }

        if c == '"' {
            i += 1;
            let start = i;
            while i < chars.len() && chars[i] != '"' && chars[i] != '\n' {
                i += 1;
            }
            if i >= chars.len() || chars[i] != '"' {
                return Err(TokenizerError::UnterminatedString);
            }
            let s: String = chars[start..i].iter().collect();
            tokens.push(Token::StringConst(s));
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let raw: String = chars[start..i].iter().collect();
            let value = raw
                .parse::<i16>()
                .map_err(|_| TokenizerError::IntConstOutOfRange(raw))?;
            tokens.push(Token::IntConst(value));
            continue;
        }

        if c.is_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if let Some(&keyword) = KEYWORDS.get(word.as_str()) {
                tokens.push(Token::Keyword(keyword));
            } else {
                tokens.push(Token::Identifier(word));
            }
            continue;
        }

        // Unrecognized character: skip, matching the tolerant behavior of
        // the reference tokenizer rather than aborting the whole file.
        i += 1;
    }

    Ok(tokens)
}

/// An indexable token stream with lookahead.
///
/// Before the first [`Tokenizer::advance`] call the cursor sits "before"
/// token 0: [`Tokenizer::current`] returns `None` and [`Tokenizer::peek_at`]
/// is relative to the not-yet-consumed first token.
pub struct Tokenizer {
    tokens: Vec<Token>,
    pos: usize,
    started: bool,
}

impl Tokenizer {
    pub fn new(source: &str) -> Result<Self, TokenizerError> {
        let stripped = strip_comments(source);
        let tokens = tokenize(&stripped)?;
        Ok(Self {
            tokens,
            pos: 0,
            started: false,
        })
    }

    #[must_use]
    pub fn has_more_tokens(&self) -> bool {
        if self.started {
            self.pos + 1 < self.tokens.len()
        } else {
            !self.tokens.is_empty()
        }
    }

    /// Advances to the next token and returns it, or `None` at end of input.
    pub fn advance(&mut self) -> Option<&Token> {
        if !self.started {
            if self.tokens.is_empty() {
                return None;
            }
            self.started = true;
        } else if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        } else {
            return None;
        }
        self.tokens.get(self.pos)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Token> {
        if self.started {
            self.tokens.get(self.pos)
        } else {
            None
        }
    }

    /// Looks `offset` tokens ahead of the current position without
    /// consuming anything. With `offset == 1` this is the token
    /// `advance()` would return next.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<&Token> {
        if self.started {
            self.tokens.get(self.pos + offset)
        } else {
            offset.checked_sub(1).and_then(|idx| self.tokens.get(idx))
        }
    }
}
