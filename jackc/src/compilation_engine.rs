//! Recursive-descent compiler: one method per Jack grammar production,
//! walking the [`Tokenizer`] stream and emitting VM commands directly
//! (no intermediate parse tree).

use std::fmt;
use std::io::Write;

use crate::symbol_table::{Kind, SymbolTable};
use crate::tokenizer::{Keyword, Token, Tokenizer, TokenizerError};
use crate::vm_writer::{ArithCommand, Segment, VMWriter};

#[derive(Debug)]
pub enum CompileError {
    Tokenizer(TokenizerError),
    UnexpectedEof,
    UnexpectedToken { expected: String, found: String },
    UnknownIdentifierKind(String),
    Io(std::io::Error),
}

impl std::error::Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tokenizer(e) => write!(f, "{e}"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::UnknownIdentifierKind(name) => {
                write!(f, "identifier `{name}` was never declared")
            }
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl From<TokenizerError> for CompileError {
    fn from(e: TokenizerError) -> Self {
        Self::Tokenizer(e)
    }
}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

fn kind_to_segment(kind: Kind) -> Segment {
    match kind {
        Kind::Static => Segment::Static,
        Kind::Field => Segment::This,
        Kind::Arg => Segment::Argument,
        Kind::Var => Segment::Local,
    }
}

pub struct CompilationEngine<W: Write> {
    tokenizer: Tokenizer,
    symbols: SymbolTable,
    vm: VMWriter<W>,
    class_name: String,
    label_counter: u32,
}

impl<W: Write> CompilationEngine<W> {
    pub fn compile(source: &str, out: W) -> Result<Self, CompileError> {
        let mut tokenizer = Tokenizer::new(source)?;
        tokenizer.advance();
        let mut engine = Self {
            tokenizer,
            symbols: SymbolTable::new(),
            vm: VMWriter::new(out),
            class_name: String::new(),
            label_counter: 0,
        };
        engine.compile_class()?;
        engine.vm.flush()?;
        Ok(engine)
    }

    fn current(&self) -> Result<&Token, CompileError> {
        self.tokenizer.current().ok_or(CompileError::UnexpectedEof)
    }

    fn bump(&mut self) {
        self.tokenizer.advance();
    }

    fn expect_symbol(&mut self, expected: char) -> Result<(), CompileError> {
        match self.current()? {
            Token::Symbol(c) if *c == expected => {
                self.bump();
                Ok(())
            }
            other => Err(CompileError::UnexpectedToken {
                expected: format!("'{expected}'"),
                found: other.to_string(),
            }),
        }
    }

    fn peek_symbol(&self, c: char) -> bool {
        matches!(self.current(), Ok(Token::Symbol(s)) if *s == c)
    }

    fn expect_keyword(&mut self, expected: Keyword) -> Result<(), CompileError> {
        match self.current()? {
            Token::Keyword(k) if *k == expected => {
                self.bump();
                Ok(())
            }
            other => Err(CompileError::UnexpectedToken {
                expected: format!("{expected:?}"),
                found: other.to_string(),
            }),
        }
    }

    fn expect_identifier(&mut self) -> Result<String, CompileError> {
        match self.current()? {
            Token::Identifier(name) => {
                let name = name.clone();
                self.bump();
                Ok(name)
            }
            other => Err(CompileError::UnexpectedToken {
                expected: "identifier".to_string(),
                found: other.to_string(),
            }),
        }
    }

    /// Consumes a `void | int | char | boolean | className` type token.
    fn expect_type(&mut self) -> Result<String, CompileError> {
        match self.current()?.clone() {
            Token::Keyword(Keyword::Int) => {
                self.bump();
                Ok("int".to_string())
            }
            Token::Keyword(Keyword::Char) => {
                self.bump();
                Ok("char".to_string())
            }
            Token::Keyword(Keyword::Boolean) => {
                self.bump();
                Ok("boolean".to_string())
            }
            Token::Keyword(Keyword::Void) => {
                self.bump();
                Ok("void".to_string())
            }
            Token::Identifier(name) => {
                self.bump();
                Ok(name)
            }
            other => Err(CompileError::UnexpectedToken {
                expected: "a type".to_string(),
                found: other.to_string(),
            }),
        }
    }

    fn next_label(&mut self, prefix: &str) -> String {
        let label = format!("{prefix}_{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    // ---- class ----

    fn compile_class(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        loop {
            match self.current()? {
                Token::Keyword(Keyword::Static) | Token::Keyword(Keyword::Field) => {
                    self.compile_class_var_dec()?;
                }
                _ => break,
            }
        }

        loop {
            match self.current()? {
                Token::Keyword(Keyword::Constructor)
                | Token::Keyword(Keyword::Function)
                | Token::Keyword(Keyword::Method) => {
                    self.compile_subroutine_dec()?;
                }
                _ => break,
            }
        }

        self.expect_symbol('}')?;
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        let kind = match self.current()? {
            Token::Keyword(Keyword::Static) => Kind::Static,
            Token::Keyword(Keyword::Field) => Kind::Field,
            other => {
                return Err(CompileError::UnexpectedToken {
                    expected: "static or field".to_string(),
                    found: other.to_string(),
                });
            }
        };
        self.bump();

        let type_name = self.expect_type()?;
        let name = self.expect_identifier()?;
        self.symbols.define(&name, &type_name, kind);

        while self.peek_symbol(',') {
            self.bump();
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &type_name, kind);
        }

        self.expect_symbol(';')?;
        Ok(())
    }

    // ---- subroutines ----

    fn compile_subroutine_dec(&mut self) -> Result<(), CompileError> {
        let subroutine_kind = match self.current()? {
            Token::Keyword(Keyword::Constructor) => Keyword::Constructor,
            Token::Keyword(Keyword::Function) => Keyword::Function,
            Token::Keyword(Keyword::Method) => Keyword::Method,
            other => {
                return Err(CompileError::UnexpectedToken {
                    expected: "constructor, function or method".to_string(),
                    found: other.to_string(),
                });
            }
        };
        self.bump();

        self.symbols.start_subroutine();
        if subroutine_kind == Keyword::Method {
            self.symbols.define("this", &self.class_name, Kind::Arg);
        }

        self.expect_type()?; // return type, unused beyond parsing
        let name = self.expect_identifier()?;
        let qualified_name = format!("{}.{name}", self.class_name);

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        let mut n_locals = 0u16;
        while matches!(self.current()?, Token::Keyword(Keyword::Var)) {
            n_locals += self.compile_var_dec()?;
        }

        self.vm.write_function(&qualified_name, n_locals)?;

        match subroutine_kind {
            Keyword::Constructor => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.vm.write_push(Segment::Constant, n_fields)?;
                self.vm.write_call("Memory.alloc", 1)?;
                self.vm.write_pop(Segment::Pointer, 0)?;
            }
            Keyword::Method => {
                self.vm.write_push(Segment::Argument, 0)?;
                self.vm.write_pop(Segment::Pointer, 0)?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')?;
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if self.peek_symbol(')') {
            return Ok(());
        }

        let type_name = self.expect_type()?;
        let name = self.expect_identifier()?;
        self.symbols.define(&name, &type_name, Kind::Arg);

        while self.peek_symbol(',') {
            self.bump();
            let type_name = self.expect_type()?;
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &type_name, Kind::Arg);
        }

        Ok(())
    }

    /// Returns the number of locals this declaration introduced.
    fn compile_var_dec(&mut self) -> Result<u16, CompileError> {
        self.expect_keyword(Keyword::Var)?;
        let type_name = self.expect_type()?;
        let name = self.expect_identifier()?;
        self.symbols.define(&name, &type_name, Kind::Var);
        let mut count = 1u16;

        while self.peek_symbol(',') {
            self.bump();
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &type_name, Kind::Var);
            count += 1;
        }

        self.expect_symbol(';')?;
        Ok(count)
    }

    // ---- statements ----

    fn compile_statements(&mut self) -> Result<(), CompileError> {
        loop {
            match self.current() {
                Ok(Token::Keyword(Keyword::Let)) => self.compile_let()?,
                Ok(Token::Keyword(Keyword::If)) => self.compile_if()?,
                Ok(Token::Keyword(Keyword::While)) => self.compile_while()?,
                Ok(Token::Keyword(Keyword::Do)) => self.compile_do()?,
                Ok(Token::Keyword(Keyword::Return)) => self.compile_return()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;
        let is_array = self.peek_symbol('[');

        if is_array {
            self.bump();
            self.push_variable(&name)?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.vm.write_arithmetic(ArithCommand::Add)?;

            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;

            self.vm.write_pop(Segment::Temp, 0)?;
            self.vm.write_pop(Segment::Pointer, 1)?;
            self.vm.write_push(Segment::Temp, 0)?;
            self.vm.write_pop(Segment::That, 0)?;
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;
            self.pop_variable(&name)?;
        }

        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        let true_label = self.next_label("IF_TRUE");
        let false_label = self.next_label("IF_FALSE");

        self.vm.write_if(&true_label)?;
        self.vm.write_goto(&false_label)?;
        self.vm.write_label(&true_label)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        if matches!(self.current(), Ok(Token::Keyword(Keyword::Else))) {
            let end_label = self.next_label("IF_END");
            self.vm.write_goto(&end_label)?;
            self.vm.write_label(&false_label)?;

            self.bump();
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;

            self.vm.write_label(&end_label)?;
        } else {
            self.vm.write_label(&false_label)?;
        }

        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::While)?;

        let exp_label = self.next_label("WHILE_EXP");
        let end_label = self.next_label("WHILE_END");

        self.vm.write_label(&exp_label)?;

        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.vm.write_arithmetic(ArithCommand::Not)?;
        self.vm.write_if(&end_label)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        self.vm.write_goto(&exp_label)?;
        self.vm.write_label(&end_label)?;

        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Do)?;
        self.compile_subroutine_call()?;
        self.expect_symbol(';')?;
        self.vm.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Return)?;
        if self.peek_symbol(';') {
            self.vm.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(';')?;
        self.vm.write_return()?;
        Ok(())
    }

    // ---- expressions ----

    fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;

        loop {
            let op = match self.current() {
                Ok(Token::Symbol(c)) if "+-*/&|<>=".contains(*c) => *c,
                _ => break,
            };
            self.bump();
            self.compile_term()?;

            match op {
                '+' => self.vm.write_arithmetic(ArithCommand::Add)?,
                '-' => self.vm.write_arithmetic(ArithCommand::Sub)?,
                '*' => self.vm.write_call("Math.multiply", 2)?,
                '/' => self.vm.write_call("Math.divide", 2)?,
                '&' => self.vm.write_arithmetic(ArithCommand::And)?,
                '|' => self.vm.write_arithmetic(ArithCommand::Or)?,
                '<' => self.vm.write_arithmetic(ArithCommand::Lt)?,
                '>' => self.vm.write_arithmetic(ArithCommand::Gt)?,
                '=' => self.vm.write_arithmetic(ArithCommand::Eq)?,
                _ => unreachable!(),
            };
        }

        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), CompileError> {
        match self.current()?.clone() {
            Token::IntConst(n) => {
                self.bump();
                self.vm.write_push(Segment::Constant, n as u16)?;
            }
            Token::StringConst(s) => {
                self.bump();
                self.vm.write_push(Segment::Constant, s.len() as u16)?;
                self.vm.write_call("String.new", 1)?;
                for ch in s.chars() {
                    self.vm.write_push(Segment::Constant, ch as u16)?;
                    self.vm.write_call("String.appendChar", 2)?;
                }
            }
            Token::Keyword(Keyword::True) => {
                self.bump();
                self.vm.write_push(Segment::Constant, 0)?;
                self.vm.write_arithmetic(ArithCommand::Not)?;
            }
            Token::Keyword(Keyword::False) | Token::Keyword(Keyword::Null) => {
                self.bump();
                self.vm.write_push(Segment::Constant, 0)?;
            }
            Token::Keyword(Keyword::This) => {
                self.bump();
                self.vm.write_push(Segment::Pointer, 0)?;
            }
            Token::Symbol('(') => {
                self.bump();
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            Token::Symbol('-') => {
                self.bump();
                self.compile_term()?;
                self.vm.write_arithmetic(ArithCommand::Neg)?;
            }
            Token::Symbol('~') => {
                self.bump();
                self.compile_term()?;
                self.vm.write_arithmetic(ArithCommand::Not)?;
            }
            Token::Identifier(name) => {
                match self.tokenizer.peek_at(1) {
                    Some(Token::Symbol('[')) => {
                        self.bump();
                        self.bump();
                        self.push_variable(&name)?;
                        self.compile_expression()?;
                        self.expect_symbol(']')?;
                        self.vm.write_arithmetic(ArithCommand::Add)?;
                        self.vm.write_pop(Segment::Pointer, 1)?;
                        self.vm.write_push(Segment::That, 0)?;
                    }
                    Some(Token::Symbol('(')) | Some(Token::Symbol('.')) => {
                        self.compile_subroutine_call()?;
                    }
                    _ => {
                        self.bump();
                        self.push_variable(&name)?;
                    }
                }
            }
            other => {
                return Err(CompileError::UnexpectedToken {
                    expected: "a term".to_string(),
                    found: other.to_string(),
                });
            }
        }

        Ok(())
    }

    /// `name(...)`, `Class.name(...)` or `obj.name(...)`. The current token
    /// on entry is the leading identifier; it has not yet been consumed.
    fn compile_subroutine_call(&mut self) -> Result<(), CompileError> {
        let first = self.expect_identifier()?;

        if self.peek_symbol('(') {
            // Call on the current object: `subName(...)`.
            self.bump();
            self.vm.write_push(Segment::Pointer, 0)?;
            let n_args = 1 + self.compile_expression_list()?;
            self.expect_symbol(')')?;
            self.vm
                .write_call(&format!("{}.{first}", self.class_name), n_args)?;
            return Ok(());
        }

        self.expect_symbol('.')?;
        let sub_name = self.expect_identifier()?;
        self.expect_symbol('(')?;

        if let Some(kind) = self.symbols.kind_of(&first) {
            // Method call on a variable: push the object as implicit arg 0.
            let segment = kind_to_segment(kind);
            let index = self.symbols.index_of(&first).expect("kind_of succeeded");
            let type_name = self
                .symbols
                .type_of(&first)
                .expect("kind_of succeeded")
                .to_string();
            self.vm.write_push(segment, index)?;
            let n_args = 1 + self.compile_expression_list()?;
            self.expect_symbol(')')?;
            self.vm.write_call(&format!("{type_name}.{sub_name}"), n_args)?;
        } else {
            // Static call: `first` names a class.
            let n_args = self.compile_expression_list()?;
            self.expect_symbol(')')?;
            self.vm.write_call(&format!("{first}.{sub_name}"), n_args)?;
        }

        Ok(())
    }

    /// Returns the number of expressions compiled.
    fn compile_expression_list(&mut self) -> Result<u16, CompileError> {
        if self.peek_symbol(')') {
            return Ok(0);
        }

        self.compile_expression()?;
        let mut count = 1u16;

        while self.peek_symbol(',') {
            self.bump();
            self.compile_expression()?;
            count += 1;
        }

        Ok(count)
    }

    fn push_variable(&mut self, name: &str) -> Result<(), CompileError> {
        let kind = self
            .symbols
            .kind_of(name)
            .ok_or_else(|| CompileError::UnknownIdentifierKind(name.to_string()))?;
        let index = self.symbols.index_of(name).expect("kind_of succeeded");
        self.vm.write_push(kind_to_segment(kind), index)?;
        Ok(())
    }

    fn pop_variable(&mut self, name: &str) -> Result<(), CompileError> {
        let kind = self
            .symbols
            .kind_of(name)
            .ok_or_else(|| CompileError::UnknownIdentifierKind(name.to_string()))?;
        let index = self.symbols.index_of(name).expect("kind_of succeeded");
        self.vm.write_pop(kind_to_segment(kind), index)?;
        Ok(())
    }
}
