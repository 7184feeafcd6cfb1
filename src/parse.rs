//! Parsing lines of 8051 assembly.
//!
//! The parser converts each source line into a [`ParsedLine`]:
//! 1. everything after the first `;` is a comment and is dropped,
//! 2. the rest is tokenized with the [`lex`] module,
//! 3. the tokens are split into an optional label, a mnemonic, and comma-separated operands.
//!
//! An operand with symbols the lexer does not recognize (e.g., `#LOW(1234H)`) is kept as text
//! and resolves to 0 at execution. Only the label and mnemonic must lex cleanly.
//!
//! A `NAME EQU expr` line is recognized separately. Its label is the constant's name
//! and its single operand is the (unresolved) expression.
//!
//! ```
//! use i8051_ensemble::parse::parse_line;
//! use i8051_ensemble::ast::{Mnemonic, Operand};
//!
//! let line = parse_line("LOOP: MOV A, #05H ; load five", 3).unwrap().unwrap();
//! assert_eq!(line.label.as_deref(), Some("LOOP"));
//! assert_eq!(line.mnemonic, Some(Mnemonic::MOV));
//! assert_eq!(line.operands, [Operand::Acc, Operand::Imm("05H".to_string())]);
//!
//! // Blank and comment-only lines have no record:
//! assert_eq!(parse_line("   ; nothing here", 4).unwrap(), None);
//! ```

pub mod lex;

use std::ops::Range;

use logos::Logos;

use crate::asm::{AsmErr, AsmErrKind};
use crate::ast::{BitAddr, Direct, Mnemonic, Operand, ParsedLine, Reg};
use crate::sfr;
use lex::{LexErr, Token};

/// Parses every line of a source file.
///
/// The result has one entry per source line, with `None` for lines that hold nothing.
pub fn parse_source(src: &str) -> Result<Vec<Option<ParsedLine>>, AsmErr> {
    src.lines()
        .enumerate()
        .map(|(i, line)| parse_line(line, i))
        .collect()
}

/// Parses one line of source.
///
/// `line_no` is the 0-based index of the line in the file.
/// This returns `Ok(None)` if the line is empty once its comment is removed.
pub fn parse_line(text: &str, line_no: usize) -> Result<Option<ParsedLine>, AsmErr> {
    let code = match text.split_once(';') {
        Some((code, _)) => code,
        None => text,
    }.trim();
    if code.is_empty() {
        return Ok(None);
    }

    let tokens: Vec<Spanned> = Token::lexer(code).spanned().collect();

    // An unrecognized symbol is only an error in the label.
    if let Some(colon) = tokens.iter().position(|(t, _)| matches!(t, Ok(Token::Colon))) {
        if let Some((Err(e), _)) = tokens[..colon].iter().find(|(t, _)| t.is_err()) {
            return Err(AsmErr::new(AsmErrKind::Lex(*e), line_no));
        }
    }

    // NAME EQU expr
    if let [(Ok(Token::Ident(name)), _), (Ok(Token::Ident(kw)), kw_span), ..] = &tokens[..] {
        if kw.eq_ignore_ascii_case("EQU") {
            let expr = code[kw_span.end..].trim();
            return Ok(Some(ParsedLine {
                label: Some(name.clone()),
                mnemonic: Some(Mnemonic::EQU),
                operands: vec![Operand::Imm(expr.to_string())],
                line_no,
            }));
        }
    }

    let (label, rest) = match &tokens[..] {
        [(Ok(Token::Ident(name)), _), (Ok(Token::Colon), _), rest @ ..] => (Some(name.clone()), rest),
        rest => (None, rest),
    };

    let (mnemonic, rest) = match rest {
        [] => (None, rest),
        [(Ok(Token::Ident(m)), _), rest @ ..] => {
            let m = m.parse::<Mnemonic>().unwrap_or_else(|e| match e {});
            (Some(m), rest)
        },
        [(Err(e), _), ..] => return Err(AsmErr::new(AsmErrKind::Lex(*e), line_no)),
        [_, ..] => return Err(AsmErr::new(AsmErrKind::ExpectedMnemonic, line_no)),
    };

    let operands = rest.split(|(t, _)| matches!(t, Ok(Token::Comma)))
        .filter(|group| !group.is_empty())
        .map(|group| {
            let text = &code[group_span(group)];
            parse_operand(group, text).map_err(|kind| AsmErr::new(kind, line_no))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(ParsedLine { label, mnemonic, operands, line_no }))
}

/// A token (or the symbol that failed to lex) and its position in the line.
type Spanned = (Result<Token, LexErr>, Range<usize>);

fn group_span(group: &[Spanned]) -> Range<usize> {
    match (group.first(), group.last()) {
        (Some((_, first)), Some((_, last))) => first.start..last.end,
        _ => 0..0,
    }
}

/// Classifies one operand from its tokens.
///
/// `text` is the source text the tokens span.
fn parse_operand(tokens: &[Spanned], text: &str) -> Result<Operand, AsmErrKind> {
    let Some(kinds) = tokens.iter().map(|(t, _)| t.as_ref().ok()).collect::<Option<Vec<_>>>() else {
        // Unrecognized symbols are kept as an expression, which resolves to 0.
        return match text.strip_prefix('#') {
            Some(imm) => Ok(Operand::Imm(imm.trim().to_string())),
            None if text.starts_with('@') => Err(AsmErrKind::UnsupportedIndirect(text.to_string())),
            None => Ok(Operand::Direct(Direct::Expr(text.to_string()))),
        };
    };

    let operand = match &kinds[..] {
        [Token::Hash, ..] => Operand::Imm(text[1..].trim().to_string()),
        [Token::At, Token::Ident(r)] => match Reg::from_name(r) {
            Some(reg) if reg.reg_no() < 2 => Operand::Indirect(reg),
            _ => return Err(AsmErrKind::UnsupportedIndirect(text.to_string())),
        },
        [Token::At, ..] => return Err(AsmErrKind::UnsupportedIndirect(text.to_string())),
        [Token::Slash, ..] => match parse_operand(&tokens[1..], text[1..].trim_start())? {
            Operand::Bit(bit) => Operand::NotBit(bit),
            Operand::Direct(Direct::Expr(e)) => match lex::parse_literal(&e) {
                Ok(n) => Operand::NotBit(BitAddr::Named(n as u8)),
                Err(_) => Operand::Direct(Direct::Expr(text.to_string())),
            },
            _ => Operand::Direct(Direct::Expr(text.to_string())),
        },
        [Token::Ident(name)] => classify_ident(name),
        [Token::Ident(base), Token::Dot, Token::Numeric(n)] => bit_field(direct_of(base), n),
        [Token::Numeric(base), Token::Dot, Token::Numeric(n)] => bit_field(Direct::Expr(base.to_string()), n),
        _ => Operand::Direct(Direct::Expr(text.to_string())),
    };

    Ok(operand)
}

fn bit_field(base: Direct, bit: &str) -> Operand {
    // An out-of-range bit index keeps its low 3 bits.
    let bit = lex::parse_literal(bit).unwrap_or(0) as u8 & 0b111;
    Operand::Bit(BitAddr::Field { base, bit })
}

fn classify_ident(name: &str) -> Operand {
    if let Some(reg) = Reg::from_name(name) {
        return Operand::Reg(reg);
    }
    match &*name.to_ascii_uppercase() {
        "A" => Operand::Acc,
        "AB" => Operand::AB,
        "DPTR" => Operand::Dptr,
        upper => match sfr::bit_by_name(upper) {
            Some(bit) => Operand::Bit(BitAddr::Named(bit)),
            None => Operand::Direct(direct_of(name)),
        }
    }
}

fn direct_of(name: &str) -> Direct {
    match sfr::by_name(name) {
        Some(addr) => Direct::Sfr(addr),
        None => Direct::Expr(name.to_string()),
    }
}
