//! VM bytecode emission.
//!
//! Formats the stack-machine command vocabulary as text, one command per
//! line, into an in-memory buffer. The caller writes the buffer to disk
//! only after a whole class has compiled, so a failed compilation never
//! leaves a partial output file.

use std::fmt;

/// The eight memory segments of the target VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The nine arithmetic/logic commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    Add,
    Sub,
    Neg,
    And,
    Or,
    Not,
    Eq,
    Lt,
    Gt,
}

impl Arithmetic {
    pub fn as_str(self) -> &'static str {
        match self {
            Arithmetic::Add => "add",
            Arithmetic::Sub => "sub",
            Arithmetic::Neg => "neg",
            Arithmetic::And => "and",
            Arithmetic::Or => "or",
            Arithmetic::Not => "not",
            Arithmetic::Eq => "eq",
            Arithmetic::Lt => "lt",
            Arithmetic::Gt => "gt",
        }
    }
}

impl fmt::Display for Arithmetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writer accumulating VM commands for one compilation unit.
#[derive(Default)]
pub struct VmWriter {
    out: String,
}

impl VmWriter {
    pub fn new() -> Self {
        VmWriter::default()
    }

    pub fn write_push(&mut self, segment: Segment, index: usize) {
        self.out.push_str(&format!("push {} {}\n", segment, index));
    }

    pub fn write_pop(&mut self, segment: Segment, index: usize) {
        self.out.push_str(&format!("pop {} {}\n", segment, index));
    }

    pub fn write_arithmetic(&mut self, command: Arithmetic) {
        self.out.push_str(command.as_str());
        self.out.push('\n');
    }

    pub fn write_label(&mut self, label: &str) {
        self.out.push_str(&format!("label {}\n", label));
    }

    pub fn write_goto(&mut self, label: &str) {
        self.out.push_str(&format!("goto {}\n", label));
    }

    pub fn write_if_goto(&mut self, label: &str) {
        self.out.push_str(&format!("if-goto {}\n", label));
    }

    pub fn write_call(&mut self, name: &str, n_args: usize) {
        self.out.push_str(&format!("call {} {}\n", name, n_args));
    }

    pub fn write_function(&mut self, name: &str, n_locals: usize) {
        self.out.push_str(&format!("function {} {}\n", name, n_locals));
    }

    pub fn write_return(&mut self) {
        self.out.push_str("return\n");
    }

    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn into_output(self) -> String {
        self.out
    }
}
