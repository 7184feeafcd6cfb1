//! Machine-cycle costs of instructions.
//!
//! Costs are static per mnemonic and operand shape, and do not depend on machine state
//! (e.g., whether a branch is taken).
//!
//! The core instruction set (moves, `ADD`/`SUBB`, `INC`/`DEC`, bit set/clear, jumps, calls,
//! `DJNZ`, stack operations) uses a fixed simulator table, which is not the datasheet's:
//! - a `MOV` costs 2 cycles unless it is `A`/`Rn` with an immediate, `A`/`Rn` or `Rn`/`A`
//! - `ADD`, `ADDC`, and `SUBB` cost 2 cycles with a direct or indirect source
//! - `DJNZ Rn` and `INC DPTR` cost 1 cycle
//!
//! The remaining instructions (`MUL`, `DIV`, conditional jumps, logic operations)
//! use the classic datasheet counts.

use crate::ast::{Mnemonic, Operand};

/// The number of machine cycles an instruction takes.
///
/// Unrecognized mnemonics take 1 cycle.
pub fn cost(mnemonic: &Mnemonic, operands: &[Operand]) -> u32 {
    use Mnemonic::*;

    let dst = operands.first();
    let src = operands.get(1);

    match mnemonic {
        SJMP | LJMP | AJMP | ACALL | LCALL | RET | RETI | PUSH | POP => 2,

        MOV => match (dst, src) {
            (Some(Operand::Acc), Some(Operand::Imm(_) | Operand::Reg(_))) => 1,
            (Some(Operand::Reg(_)), Some(Operand::Imm(_) | Operand::Acc)) => 1,
            _ => 2,
        },

        ADD | ADDC | SUBB => match src {
            Some(Operand::Imm(_) | Operand::Reg(_)) => 1,
            _ => 2,
        },

        DJNZ => match dst {
            Some(Operand::Reg(_)) => 1,
            _ => 2,
        },

        MUL | DIV => 4,

        JMP | CALL
        | JC | JNC | JZ | JNZ | JB | JNB | JBC | CJNE => 2,

        ANL | ORL | XRL => match (dst, src) {
            (Some(Operand::Direct(_)), Some(Operand::Imm(_))) => 2,
            (Some(d), _) if d.is_carry() => 2,
            _ => 1,
        },

        _ => 1,
    }
}
