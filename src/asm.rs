//! Loading assembly source into an executable [`Program`].
//!
//! There is no binary encoding step. A [`Program`] is the sequence of parsed source lines,
//! and the simulator's PC is an index into that sequence.
//!
//! The assembler module notably consists of:
//! - [`assemble`]: parses source text and builds the [`Program`].
//! - [`SymbolTable`]: the constants (`EQU`) and code labels defined by the source.
//! - [`value`]: resolves literal and symbolic tokens into integers.

pub mod value;

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::ast::{Mnemonic, ParsedLine};
use crate::err::LexErr;
use crate::parse::parse_source;

/// Parses and loads source code into a [`Program`].
///
/// # Example
/// ```
/// use i8051_ensemble::asm::{assemble, Symbol};
///
/// let src = "
///     ORG 0000H
///     COUNT EQU 3
/// MAIN:
///     MOV R0, #COUNT
///     SJMP MAIN
/// ";
/// let program = assemble(src).unwrap();
///
/// assert_eq!(program.symbols().get("COUNT"), Some(Symbol::Const(3)));
/// assert_eq!(program.symbols().code_label("MAIN"), Some(3));
/// // the first line with a mnemonic that is not ORG:
/// assert_eq!(program.entry(), 2);
/// ```
pub fn assemble(src: &str) -> Result<Program, AsmErr> {
    let lines = parse_source(src)?;
    Ok(Program::new(lines))
}

/// Kinds of errors that can occur while loading source.
///
/// See [`AsmErr`] for this error type with the line included.
#[derive(Debug, PartialEq, Eq, Hash, Clone, thiserror::Error)]
pub enum AsmErrKind {
    /// The line could not be tokenized.
    #[error("{0}")]
    Lex(LexErr),
    /// The line has a label or operands but does not start with a mnemonic.
    #[error("expected a mnemonic")]
    ExpectedMnemonic,
    /// An indirect operand other than `@R0` or `@R1` was used.
    #[error("unsupported indirect operand {0}")]
    UnsupportedIndirect(String),
}

/// Error from loading source code.
#[derive(Debug, PartialEq, Eq, Hash, Clone, thiserror::Error)]
#[error("line {}: {}", .line + 1, .kind)]
pub struct AsmErr {
    /// The kind of error.
    pub kind: AsmErrKind,
    /// The 0-based source line the error occurred on.
    pub line: usize,
}
impl AsmErr {
    /// Creates a new [`AsmErr`].
    pub fn new(kind: AsmErrKind, line: usize) -> Self {
        AsmErr { kind, line }
    }
}
impl crate::err::Error for AsmErr {
    fn line(&self) -> Option<usize> {
        Some(self.line)
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match &self.kind {
            AsmErrKind::Lex(e) => crate::err::Error::help(e),
            AsmErrKind::ExpectedMnemonic => Some("a line is `[LABEL:] MNEMONIC [OPERAND, ...]` or `NAME EQU VALUE`".into()),
            AsmErrKind::UnsupportedIndirect(_) => Some("only @R0 and @R1 can be used for indirect addressing".into()),
        }
    }
}

/// A symbol defined by the source.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Symbol {
    /// A constant (from `NAME EQU value`). This cannot be jumped to.
    Const(i64),
    /// A code label, holding the index of the line that defines it.
    Code(usize),
}
impl Symbol {
    /// The integer value of this symbol.
    ///
    /// For a code label, this is its line index.
    pub fn value(self) -> i64 {
        match self {
            Symbol::Const(v) => v,
            Symbol::Code(idx) => idx as i64,
        }
    }
}

/// The symbol table, mapping names (case-sensitive) to their [`Symbol`].
///
/// Constants and code labels share one namespace.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}
impl SymbolTable {
    /// Creates an empty symbol table.
    pub fn new() -> Self {
        Default::default()
    }

    /// Gets the symbol with the given name.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).copied()
    }

    /// Gets the value of a symbol (see [`Symbol::value`]).
    pub fn value(&self, name: &str) -> Option<i64> {
        self.get(name).map(Symbol::value)
    }

    /// Gets the line index of a code label.
    ///
    /// This is `None` for constants.
    pub fn code_label(&self, name: &str) -> Option<usize> {
        match self.get(name)? {
            Symbol::Code(idx) => Some(idx),
            Symbol::Const(_) => None,
        }
    }

    /// Defines a symbol, returning the symbol it replaced (if any).
    pub fn insert(&mut self, name: &str, sym: Symbol) -> Option<Symbol> {
        match self.symbols.entry(name.to_string()) {
            Entry::Occupied(mut e) => Some(e.insert(sym)),
            Entry::Vacant(e) => {
                e.insert(sym);
                None
            }
        }
    }

    /// Iterates over all symbols.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Symbol)> + '_ {
        self.symbols.iter().map(|(name, &sym)| (name.as_str(), sym))
    }

    /// The number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether there are no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A loaded program.
///
/// This holds one entry per source line (including lines with no content),
/// so that the PC (a line index) can index it directly.
/// A program does not change after it is built. Loading new source creates a new program.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Program {
    lines: Vec<Option<ParsedLine>>,
    symbols: SymbolTable,
    entry: usize,
    origins: BTreeMap<u16, usize>,
}
impl Program {
    /// Builds a program from parsed lines.
    ///
    /// This pass defines every symbol, records the line of each `ORG` directive,
    /// and finds the entry line.
    pub fn new(lines: Vec<Option<ParsedLine>>) -> Self {
        let mut symbols = SymbolTable::new();
        let mut origins = BTreeMap::new();
        let mut entry = None;

        for (idx, line) in lines.iter().enumerate() {
            let Some(line) = line else { continue };

            let defined = match (&line.label, &line.mnemonic) {
                (Some(name), Some(Mnemonic::EQU)) => {
                    let value = line.operands.first()
                        .map_or(0, |op| value::operand_value(op, &symbols));
                    Some((name, Symbol::Const(value)))
                },
                (Some(name), _) => Some((name, Symbol::Code(idx))),
                (None, _) => None,
            };
            if let Some((name, sym)) = defined {
                if let Some(old) = symbols.insert(name, sym) {
                    log::warn!("line {}: {name} redefined (was {old:?}, now {sym:?})", idx + 1);
                }
            }

            match &line.mnemonic {
                Some(Mnemonic::ORG) => {
                    let addr = line.operands.first()
                        .map_or(0, |op| value::operand_value(op, &symbols));
                    origins.insert(addr as u16, idx);
                },
                Some(_) if entry.is_none() => entry = Some(idx),
                _ => {}
            }
        }

        Program {
            lines,
            symbols,
            entry: entry.unwrap_or(0),
            origins,
        }
    }

    /// All lines of the program, indexed by line number.
    pub fn lines(&self) -> &[Option<ParsedLine>] {
        &self.lines
    }

    /// Gets the parsed line at the given index.
    ///
    /// This is `None` if the index is out of range or the line is empty.
    pub fn line(&self, idx: usize) -> Option<&ParsedLine> {
        self.lines.get(idx)?.as_ref()
    }

    /// The number of lines in the program.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the program has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The program's symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The line the PC starts at.
    ///
    /// This is the first line with a mnemonic other than `ORG`.
    /// Earlier lines are skipped, but can still be jumped to.
    pub fn entry(&self) -> usize {
        self.entry
    }

    /// The line of the `ORG` directive with the given address, if there is one.
    ///
    /// If several `ORG` directives share an address, this is the last of them.
    pub fn origin_line(&self, addr: u16) -> Option<usize> {
        self.origins.get(&addr).copied()
    }
}
