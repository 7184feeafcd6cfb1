//! Resolving tokens to integer values.
//!
//! Resolution is permissive: a token that is neither a known symbol nor a valid literal
//! resolves to 0. This is logged (at debug level), but is not an error.

use crate::ast::{Direct, Operand};
use crate::parse::lex::parse_literal;

use super::SymbolTable;

/// Resolves a token to an integer.
///
/// A leading `#` is ignored. If the rest of the token is a symbol, this is the symbol's value.
/// Otherwise, the token is parsed as a literal (see [`parse_literal`]).
///
/// ```
/// use i8051_ensemble::asm::{SymbolTable, Symbol};
/// use i8051_ensemble::asm::value::resolve;
///
/// let mut symbols = SymbolTable::new();
/// symbols.insert("LIMIT", Symbol::Const(0x40));
///
/// assert_eq!(resolve("#LIMIT", &symbols), 0x40);
/// assert_eq!(resolve("0FFH", &symbols), 0xFF);
/// assert_eq!(resolve("#1010B", &symbols), 0b1010);
/// assert_eq!(resolve("nonsense", &symbols), 0);
/// ```
pub fn resolve(token: &str, symbols: &SymbolTable) -> i64 {
    let text = token.trim();
    let text = text.strip_prefix('#').unwrap_or(text).trim();

    if let Some(value) = symbols.value(text) {
        return value;
    }
    match parse_literal(text) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("could not resolve {text:?} ({e}), using 0");
            0
        }
    }
}

/// Resolves the value of an operand that names a number.
///
/// Immediates and direct expressions are resolved with [`resolve`]; a named SFR is its address.
/// Every other operand kind has no numeric value and resolves to 0.
pub fn operand_value(op: &Operand, symbols: &SymbolTable) -> i64 {
    match op {
        Operand::Imm(text) | Operand::Direct(Direct::Expr(text)) => resolve(text, symbols),
        Operand::Direct(Direct::Sfr(addr)) => i64::from(*addr),
        _ => 0,
    }
}
