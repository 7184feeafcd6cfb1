//! Tokenizing 8051 assembly.
//!
//! This module holds the tokens that characterize a line of 8051 assembly ([`Token`]).
//! The parser splits each line into tokens with this lexer and classifies operands from them.
//!
//! Numeric literals are kept as raw text here. They are validated later by [`parse_literal`],
//! since a malformed literal is not a load error (it resolves to 0 at execution).
//! For the same reason, the parser only rejects unrecognized symbols in a line's label or mnemonic.

use std::num::IntErrorKind;

use logos::Logos;

/// A unit of information in a line of 8051 source code.
#[derive(Debug, Logos, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t\r\n]+", error = LexErr)]
pub enum Token {
    // Like identifiers, this regex spans over technically invalid literals (e.g., `12XYZ`).
    // Those are collected as one unit and checked by `parse_literal`.

    /// A numeric literal (e.g., `10`, `0FFH`, `1010B`).
    #[regex(r"[0-9][A-Za-z0-9_]*", |lx| lx.slice().to_string())]
    Numeric(String),

    /// An identifier.
    ///
    /// This can refer to a mnemonic, a register, an SFR, a named bit, or a symbol.
    #[regex(r"[A-Za-z_?][A-Za-z0-9_?]*", |lx| lx.slice().to_string())]
    Ident(String),

    /// A quoted character or string literal (e.g., `'A'`, `"hi"`).
    #[regex(r"'[^'\n]*'", |lx| lx.slice().to_string())]
    #[regex(r#""[^"\n]*""#, |lx| lx.slice().to_string())]
    Quoted(String),

    /// The immediate marker.
    #[token("#")]
    Hash,

    /// The indirect marker.
    #[token("@")]
    At,

    /// The bit separator in `NAME.n`.
    #[token(".")]
    Dot,

    /// The current line (e.g., `SJMP $`).
    #[token("$")]
    Dollar,

    /// A negation sign.
    #[token("-")]
    Minus,

    /// The bit complement marker (e.g., `ANL C, /P1.0`).
    #[token("/")]
    Slash,

    /// A colon, which ends a label.
    #[token(":")]
    Colon,

    /// A comma, which delineates operands of an instruction.
    #[token(",")]
    Comma,
}

/// Any errors raised in attempting to tokenize a line or parse a literal.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default, thiserror::Error)]
pub enum LexErr {
    /// Literal has no digits.
    #[error("empty numeric literal")]
    EmptyLiteral,
    /// Literal ending with `H` has invalid hex digits.
    #[error("invalid hex literal")]
    InvalidHex,
    /// Literal ending with `B` has digits other than 0 and 1.
    #[error("invalid binary literal")]
    InvalidBin,
    /// Literal has digits other than 0-9.
    #[error("invalid decimal literal")]
    InvalidDec,
    /// Literal cannot be represented by the simulator.
    #[error("numeric literal is too large")]
    DoesNotFit,
    /// A symbol was used which is not allowed in 8051 assembly files.
    #[default]
    #[error("unrecognized symbol")]
    InvalidSymbol,
}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::EmptyLiteral  => Some("there should be digits here".into()),
            LexErr::InvalidHex    => Some("a hex literal consists of 0-9, A-F and ends with 'H' (e.g., 0FFH)".into()),
            LexErr::InvalidBin    => Some("a binary literal consists of 0 and 1 and ends with 'B' (e.g., 1010B)".into()),
            LexErr::InvalidDec    => Some("a decimal literal only consists of digits 0-9".into()),
            LexErr::DoesNotFit    => Some(format!("literals must be within [{}, {}]", i64::MIN, i64::MAX).into()),
            LexErr::InvalidSymbol => Some("this char does not occur in any token in 8051 assembly".into()),
        }
    }
}

/// Helper that converts an int error kind to its corresponding LexErr.
fn convert_int_error(e: &IntErrorKind, invalid_digits_err: LexErr) -> LexErr {
    match e {
        IntErrorKind::Empty        => LexErr::EmptyLiteral,
        IntErrorKind::PosOverflow  => LexErr::DoesNotFit,
        IntErrorKind::NegOverflow  => LexErr::DoesNotFit,
        _ => invalid_digits_err,
    }
}

/// Parses the text of a literal into an integer.
///
/// The accepted forms are:
/// - hexadecimal, with an `H` suffix (`0FFH`, `10h`)
/// - binary, with a `B` suffix (`1010B`)
/// - decimal (`42`, `-1`)
/// - a quoted single character (`'A'`), which is its character code
///
/// The `H` suffix is checked before the `B` suffix, so `0BH` is hex.
pub fn parse_literal(text: &str) -> Result<i64, LexErr> {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        let mut chars = inner.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(i64::from(u32::from(c))),
            _ => Err(LexErr::InvalidDec),
        };
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };
    let upper = digits.to_ascii_uppercase();
    let value = if let Some(hex) = upper.strip_suffix('H') {
        i64::from_str_radix(hex, 16).map_err(|e| convert_int_error(e.kind(), LexErr::InvalidHex))?
    } else if let Some(bin) = upper.strip_suffix('B') {
        i64::from_str_radix(bin, 2).map_err(|e| convert_int_error(e.kind(), LexErr::InvalidBin))?
    } else {
        upper.parse::<i64>().map_err(|e| convert_int_error(e.kind(), LexErr::InvalidDec))?
    };

    match negative {
        true  => value.checked_neg().ok_or(LexErr::DoesNotFit),
        false => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use logos::Logos;

    use crate::err::LexErr;
    use super::{parse_literal, Token};

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }
    fn numeric(s: &str) -> Token {
        Token::Numeric(s.to_string())
    }

    #[test]
    fn test_instruction_line() {
        let mut tokens = Token::lexer("LOOP: MOV A, #0FFH");
        assert_eq!(tokens.next(), Some(Ok(ident("LOOP"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Colon)));
        assert_eq!(tokens.next(), Some(Ok(ident("MOV"))));
        assert_eq!(tokens.next(), Some(Ok(ident("A"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), Some(Ok(Token::Hash)));
        assert_eq!(tokens.next(), Some(Ok(numeric("0FFH"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_bit_and_indirect() {
        let mut tokens = Token::lexer("SETB P1.0");
        assert_eq!(tokens.next(), Some(Ok(ident("SETB"))));
        assert_eq!(tokens.next(), Some(Ok(ident("P1"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Dot)));
        assert_eq!(tokens.next(), Some(Ok(numeric("0"))));
        assert_eq!(tokens.next(), None);

        let mut tokens = Token::lexer("MOV @R0, 20H.3");
        assert_eq!(tokens.next(), Some(Ok(ident("MOV"))));
        assert_eq!(tokens.next(), Some(Ok(Token::At)));
        assert_eq!(tokens.next(), Some(Ok(ident("R0"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), Some(Ok(numeric("20H"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Dot)));
        assert_eq!(tokens.next(), Some(Ok(numeric("3"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_misc_tokens() {
        let mut tokens = Token::lexer("SJMP $ 'A' \"hi\" -5 /");
        assert_eq!(tokens.next(), Some(Ok(ident("SJMP"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Dollar)));
        assert_eq!(tokens.next(), Some(Ok(Token::Quoted("'A'".to_string()))));
        assert_eq!(tokens.next(), Some(Ok(Token::Quoted("\"hi\"".to_string()))));
        assert_eq!(tokens.next(), Some(Ok(Token::Minus)));
        assert_eq!(tokens.next(), Some(Ok(numeric("5"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Slash)));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_invalid_symbol() {
        let mut tokens = Token::lexer("MOV A, (30H)");
        assert_eq!(tokens.next(), Some(Ok(ident("MOV"))));
        assert_eq!(tokens.next(), Some(Ok(ident("A"))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), Some(Err(LexErr::InvalidSymbol)));
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_literal("0FFH"), Ok(0xFF));
        assert_eq!(parse_literal("10h"), Ok(0x10));
        assert_eq!(parse_literal("1010B"), Ok(0b1010));
        assert_eq!(parse_literal("0BH"), Ok(0x0B));
        assert_eq!(parse_literal("42"), Ok(42));
        assert_eq!(parse_literal("-1"), Ok(-1));
        assert_eq!(parse_literal("'A'"), Ok(0x41));
    }

    #[test]
    fn test_literals_invalid() {
        assert_eq!(parse_literal(""), Err(LexErr::EmptyLiteral));
        assert_eq!(parse_literal("H"), Err(LexErr::EmptyLiteral));
        assert_eq!(parse_literal("FGH"), Err(LexErr::InvalidHex));
        assert_eq!(parse_literal("102B"), Err(LexErr::InvalidBin));
        assert_eq!(parse_literal("12X"), Err(LexErr::InvalidDec));
        assert_eq!(parse_literal("99999999999999999999"), Err(LexErr::DoesNotFit));
        assert_eq!(parse_literal("'AB'"), Err(LexErr::InvalidDec));
    }
}
