//! Translation of parsed VM [`Command`]s into Hack assembly text.

use std::io::{self, Write};

use crate::parser::{ArithOp, Command, Segment};

/// Writes a run of fixed assembly lines in one `write_all`, for the spots
/// with no per-call interpolation.
macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

/// Writes Hack assembly for a stream of VM commands.
///
/// Generic over any [`Write`] sink so tests can target an in-memory buffer
/// instead of a file.
pub struct CodeWriter<W: Write> {
    out: W,
    current_file: String,
    current_function: String,
    comparison_counter: u32,
    return_counter: u32,
}

impl<W: Write> CodeWriter<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            current_file: String::new(),
            current_function: String::new(),
            comparison_counter: 0,
            return_counter: 0,
        }
    }

    /// Begins translation of a new source file: resets the static-segment
    /// prefix. Function-label context is *not* reset, matching the VM
    /// convention that functions stay addressable across file boundaries
    /// within the same translated program.
    pub fn set_file_name(&mut self, name: &str) {
        self.current_file.clear();
        self.current_file.push_str(name);
    }

    /// Writes the bootstrap sequence (`SP=256; call Sys.init 0`). Must be
    /// the first thing written to the output, when written at all.
    pub fn write_init(&mut self) -> io::Result<()> {
        write_asm!(self.out, "// bootstrap" "@256" "D=A" "@SP" "M=D")?;
        self.write_call("Sys.init", 0)
    }

    pub fn write_command(&mut self, command: &Command) -> io::Result<()> {
        writeln!(self.out, "// {command:?}")?;
        match command {
            Command::Arithmetic(op) => self.write_arithmetic(*op),
            Command::Push(segment, index) => self.write_push(*segment, *index),
            Command::Pop(segment, index) => self.write_pop(*segment, *index),
            Command::Label(label) => self.write_label(label),
            Command::Goto(label) => self.write_goto(label),
            Command::IfGoto(label) => self.write_if(label),
            Command::Function(name, n_vars) => self.write_function(name, *n_vars),
            Command::Call(name, n_args) => self.write_call(name, *n_args),
            Command::Return => self.write_return(),
        }
    }

    fn write_arithmetic(&mut self, op: ArithOp) -> io::Result<()> {
        match op {
            ArithOp::Add => self.write_binary_op("D+M"),
            ArithOp::Sub => self.write_binary_op("M-D"),
            ArithOp::And => self.write_binary_op("D&M"),
            ArithOp::Or => self.write_binary_op("D|M"),
            ArithOp::Neg => self.write_unary_op("-M"),
            ArithOp::Not => self.write_unary_op("!M"),
            ArithOp::ShiftLeft => self.write_unary_op("M<<"),
            ArithOp::ShiftRight => self.write_unary_op("M>>"),
            ArithOp::Eq => self.write_comparison("JEQ"),
            ArithOp::Gt => self.write_comparison("JGT"),
            ArithOp::Lt => self.write_comparison("JLT"),
        }
    }

    /// `D op M` folded into the stack's new top in place: one pop (for the
    /// second operand into D), one peek (for the first operand, left as M),
    /// net effect SP -= 1.
    fn write_unary_op(&mut self, operation: &str) -> io::Result<()> {
        write_asm!(self.out, "@SP" "A=M-1")?;
        writeln!(self.out, "M={operation}")
    }

    fn write_binary_op(&mut self, operation: &str) -> io::Result<()> {
        write_asm!(self.out, "@SP" "AM=M-1" "D=M" "@SP" "A=M-1")?;
        writeln!(self.out, "M={operation}")
    }

    /// Overflow-safe `eq`/`gt`/`lt`. When the two operands have the same
    /// sign, `x - y` cannot overflow i16 and is compared directly against
    /// zero. When the signs differ, the subtraction is skipped entirely and
    /// the result follows from the sign of `x` alone (for `eq`, differing
    /// signs can never be equal, since a zero operand is never negative).
    fn write_comparison(&mut self, jump: &str) -> io::Result<()> {
        let n = self.comparison_counter;
        self.comparison_counter += 1;

        // D = y, stashed in R13
        write_asm!(self.out, "@SP" "AM=M-1" "D=M" "@R13" "M=D")?;
        // D = x, stashed in R14
        write_asm!(self.out, "@SP" "AM=M-1" "D=M" "@R14" "M=D")?;

        // Branch on whether x and y share a sign.
        writeln!(self.out, "@POS_{n}")?;
        writeln!(self.out, "D;JGE")?; // D still holds x here

        // x < 0
        writeln!(self.out, "@R13")?;
        writeln!(self.out, "D=M")?; // D = y
        writeln!(self.out, "@SAME_SIGN_{n}")?;
        writeln!(self.out, "D;JLT")?; // y < 0 too: same sign
        writeln!(self.out, "@DIFF_SIGN_{n}")?;
        writeln!(self.out, "0;JMP")?;

        writeln!(self.out, "(POS_{n})")?;
        // x >= 0
        writeln!(self.out, "@R13")?;
        writeln!(self.out, "D=M")?; // D = y
        writeln!(self.out, "@SAME_SIGN_{n}")?;
        writeln!(self.out, "D;JGE")?; // y >= 0 too: same sign
        writeln!(self.out, "@DIFF_SIGN_{n}")?;
        writeln!(self.out, "0;JMP")?;

        writeln!(self.out, "(SAME_SIGN_{n})")?;
        writeln!(self.out, "@R14")?;
        writeln!(self.out, "D=M")?; // D = x
        writeln!(self.out, "@R13")?;
        writeln!(self.out, "D=D-M")?; // D = x - y, safe: same sign
        writeln!(self.out, "@TRUE_{n}")?;
        writeln!(self.out, "D;{jump}")?;
        writeln!(self.out, "@FALSE_{n}")?;
        writeln!(self.out, "0;JMP")?;

        writeln!(self.out, "(DIFF_SIGN_{n})")?;
        writeln!(self.out, "@R14")?;
        writeln!(self.out, "D=M")?; // D = x
        match jump {
            "JGT" => {
                // differing signs, x > y iff x >= 0 (x positive, y negative)
                writeln!(self.out, "@TRUE_{n}")?;
                writeln!(self.out, "D;JGE")?;
                writeln!(self.out, "@FALSE_{n}")?;
                writeln!(self.out, "0;JMP")?;
            }
            "JLT" => {
                // differing signs, x < y iff x < 0
                writeln!(self.out, "@TRUE_{n}")?;
                writeln!(self.out, "D;JLT")?;
                writeln!(self.out, "@FALSE_{n}")?;
                writeln!(self.out, "0;JMP")?;
            }
            _ => {
                // eq: differing signs are never equal
                writeln!(self.out, "@FALSE_{n}")?;
                writeln!(self.out, "0;JMP")?;
            }
        }

        writeln!(self.out, "(TRUE_{n})")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "A=M")?;
        writeln!(self.out, "M=-1")?;
        writeln!(self.out, "@END_{n}")?;
        writeln!(self.out, "0;JMP")?;

        writeln!(self.out, "(FALSE_{n})")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "A=M")?;
        writeln!(self.out, "M=0")?;

        writeln!(self.out, "(END_{n})")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "M=M+1")
    }

    fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        match segment {
            Segment::Constant => {
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "D=A")?;
            }
            Segment::Static => {
                writeln!(self.out, "@{}.{index}", self.current_file)?;
                writeln!(self.out, "D=M")?;
            }
            Segment::Temp => {
                writeln!(self.out, "@{}", 5 + index)?;
                writeln!(self.out, "D=M")?;
            }
            Segment::Pointer => {
                let base = if index == 0 { "THIS" } else { "THAT" };
                writeln!(self.out, "@{base}")?;
                writeln!(self.out, "D=M")?;
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                writeln!(self.out, "@{}", segment_symbol(segment))?;
                writeln!(self.out, "D=M")?;
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "A=D+A")?;
                writeln!(self.out, "D=M")?;
            }
        }
        self.write_push_d()
    }

    fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        match segment {
            Segment::Static => {
                self.write_pop_to_d()?;
                writeln!(self.out, "@{}.{index}", self.current_file)?;
                writeln!(self.out, "M=D")
            }
            Segment::Temp => {
                self.write_pop_to_d()?;
                writeln!(self.out, "@{}", 5 + index)?;
                writeln!(self.out, "M=D")
            }
            Segment::Pointer => {
                let base = if index == 0 { "THIS" } else { "THAT" };
                self.write_pop_to_d()?;
                writeln!(self.out, "@{base}")?;
                writeln!(self.out, "M=D")
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                writeln!(self.out, "@{}", segment_symbol(segment))?;
                writeln!(self.out, "D=M")?;
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "D=D+A")?;
                writeln!(self.out, "@R13")?;
                writeln!(self.out, "M=D")?;
                self.write_pop_to_d()?;
                writeln!(self.out, "@R13")?;
                writeln!(self.out, "A=M")?;
                writeln!(self.out, "M=D")
            }
            // `parser::parse_line` rejects `pop constant` before a `Command`
            // is ever constructed, so this arm is unreached in practice; it
            // returns an error rather than panicking so a caller that builds
            // a `Command::Pop` by hand still gets a diagnostic, not an abort.
            Segment::Constant => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "pop constant is not a valid VM command",
            )),
        }
    }

    fn write_push_d(&mut self) -> io::Result<()> {
        write_asm!(self.out, "@SP" "A=M" "M=D" "@SP" "M=M+1")
    }

    fn write_pop_to_d(&mut self) -> io::Result<()> {
        write_asm!(self.out, "@SP" "AM=M-1" "D=M")
    }

    fn qualified_label(&self, label: &str) -> String {
        if self.current_function.is_empty() {
            label.to_string()
        } else {
            format!("{}${label}", self.current_function)
        }
    }

    fn write_label(&mut self, label: &str) -> io::Result<()> {
        let full = self.qualified_label(label);
        writeln!(self.out, "({full})")
    }

    fn write_goto(&mut self, label: &str) -> io::Result<()> {
        let full = self.qualified_label(label);
        writeln!(self.out, "@{full}")?;
        writeln!(self.out, "0;JMP")
    }

    fn write_if(&mut self, label: &str) -> io::Result<()> {
        let full = self.qualified_label(label);
        self.write_pop_to_d()?;
        writeln!(self.out, "@{full}")?;
        writeln!(self.out, "D;JNE")
    }

    fn write_function(&mut self, name: &str, n_vars: u16) -> io::Result<()> {
        self.current_function.clear();
        self.current_function.push_str(name);

        writeln!(self.out, "({name})")?;
        for _ in 0..n_vars {
            write_asm!(self.out, "@SP" "A=M" "M=0" "@SP" "M=M+1")?;
        }
        Ok(())
    }

    fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        let n = self.return_counter;
        self.return_counter += 1;
        let return_label = format!("RET_ADDRESS_{n}");

        writeln!(self.out, "@{return_label}")?;
        writeln!(self.out, "D=A")?;
        self.write_push_d()?;

        for segment in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{segment}")?;
            writeln!(self.out, "D=M")?;
            self.write_push_d()?;
        }

        // ARG = SP - 5 - n_args
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@5")?;
        writeln!(self.out, "D=D-A")?;
        writeln!(self.out, "@{n_args}")?;
        writeln!(self.out, "D=D-A")?;
        writeln!(self.out, "@ARG")?;
        writeln!(self.out, "M=D")?;

        // LCL = SP
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@LCL")?;
        writeln!(self.out, "M=D")?;

        writeln!(self.out, "@{name}")?;
        writeln!(self.out, "0;JMP")?;
        writeln!(self.out, "({return_label})")
    }

    /// Return address must be read out of `*(FRAME-5)` and stashed in R14
    /// *before* the return value overwrites `*ARG`: for a 0-argument callee,
    /// `*ARG` and the frame's saved return-address slot can alias, so
    /// writing the return value first would clobber R14's source.
    fn write_return(&mut self) -> io::Result<()> {
        writeln!(self.out, "@LCL")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@R13")?; // R13 = FRAME
        writeln!(self.out, "M=D")?;

        writeln!(self.out, "@5")?;
        writeln!(self.out, "A=D-A")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@R14")?; // R14 = RET, saved before *ARG is touched
        writeln!(self.out, "M=D")?;

        self.write_pop_to_d()?;
        writeln!(self.out, "@ARG")?;
        writeln!(self.out, "A=M")?;
        writeln!(self.out, "M=D")?; // *ARG = pop()

        writeln!(self.out, "@ARG")?;
        writeln!(self.out, "D=M+1")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "M=D")?; // SP = ARG + 1

        for (offset, segment) in [(1, "THAT"), (2, "THIS"), (3, "ARG"), (4, "LCL")] {
            writeln!(self.out, "@R13")?;
            writeln!(self.out, "D=M")?;
            writeln!(self.out, "@{offset}")?;
            writeln!(self.out, "A=D-A")?;
            writeln!(self.out, "D=M")?;
            writeln!(self.out, "@{segment}")?;
            writeln!(self.out, "M=D")?;
        }

        writeln!(self.out, "@R14")?;
        writeln!(self.out, "A=M")?;
        writeln!(self.out, "0;JMP")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn segment_symbol(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        Segment::That => "THAT",
        _ => unreachable!("segment_symbol called on a segment with no direct base register"),
    }
}
