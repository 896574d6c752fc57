//! Shared error taxonomy for every pipeline stage.
//!
//! Each stage surfaces exactly one diagnostic and stops; there is no stage that retries a
//! previous one. The taxonomy is closed: lex/parse/compile problems become a [`Diagnostic`],
//! runtime problems become a [`RuntimeError`].

use std::error::Error;
use std::fmt::{self, Display};

/// A 1-based line and column, as reported by the lexer for every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of problem that kept a program from compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An `UNKNOWN` token reached the parser.
    LexicalError,
    /// A grammar violation, or an invalid assignment target.
    SyntaxError,
    /// An identifier that is neither a known variable nor a known function.
    UndefinedName,
}

/// A compile-time problem: lexical, syntactic, or a name the compiler couldn't resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} ({})", self.kind, self.message, self.position)
    }
}

impl Error for Diagnostic {}

/// The kind of problem the virtual machine hit while executing bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    DivisionByZero,
    StackUnderflow,
    BadInstruction,
    ExecutionLimitExceeded,
}

/// A runtime problem, tagged with the program counter at which it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    pub pc: usize,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>, pc: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            pc,
        }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} (pc={})", self.kind, self.message, self.pc)
    }
}

impl Error for RuntimeError {}
