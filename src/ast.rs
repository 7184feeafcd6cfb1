//! Components relating to the parsed representation of 8051 assembly lines.
//!
//! These components together are used to construct a [`ParsedLine`]:
//! an optional label, an optional [`Mnemonic`], and the [`Operand`]s of that line.

use std::fmt::Write as _;
use std::num::TryFromIntError;

use crate::sfr;

/// A general register in the currently selected bank. Must be between 0 and 7.
///
/// This `Reg` struct can either be constructed by selecting a register from [`reg_consts`],
/// or by using [`Reg::try_from`].
///
/// ## Examples
///
/// ```text
/// MOV R0, #10
///     ~~
/// DJNZ R7, LOOP
///      ~~
/// MOV A, @R1
///         ~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Reg(pub(crate) u8);

/// Register constants!
pub mod reg_consts {
    use super::Reg;

    /// The 0th register of the selected bank.
    pub const R0: Reg = Reg(0);
    /// The 1st register of the selected bank.
    pub const R1: Reg = Reg(1);
    /// The 2nd register of the selected bank.
    pub const R2: Reg = Reg(2);
    /// The 3rd register of the selected bank.
    pub const R3: Reg = Reg(3);
    /// The 4th register of the selected bank.
    pub const R4: Reg = Reg(4);
    /// The 5th register of the selected bank.
    pub const R5: Reg = Reg(5);
    /// The 6th register of the selected bank.
    pub const R6: Reg = Reg(6);
    /// The 7th register of the selected bank.
    pub const R7: Reg = Reg(7);
}
impl Reg {
    /// Gets the register number of this [`Reg`]. This is always between 0 and 7.
    pub fn reg_no(self) -> u8 {
        self.0
    }

    /// Parses a register name (`R0`-`R7`, case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.as_bytes() {
            &[r, n @ b'0'..=b'7'] if r.eq_ignore_ascii_case(&b'R') => Some(Reg(n - b'0')),
            _ => None
        }
    }
}
impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}
impl From<Reg> for usize {
    fn from(value: Reg) -> Self {
        usize::from(value.0)
    }
}
impl TryFrom<u8> for Reg {
    type Error = TryFromIntError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0..=7 => Ok(Reg(value)),
            // HACKy, but there's no other way to create this error
            _     => u8::try_from(256).map(|_| unreachable!("should've been TryFromIntError")),
        }
    }
}

macro_rules! mnemonic_enum {
    (directives: [$($dir:ident),+], instructions: [$($instr:ident),+]) => {
        /// An instruction or directive mnemonic.
        ///
        /// Mnemonics are case-insensitive.
        /// Anything unrecognized is kept as [`Mnemonic::Other`] (uppercased) and executes as a no-op.
        #[derive(Debug, PartialEq, Eq, Hash, Clone)]
        pub enum Mnemonic {
            $(
                #[allow(missing_docs)]
                $dir
            ),+,
            $(
                #[allow(missing_docs)]
                $instr
            ),+,
            #[allow(missing_docs)]
            Other(String)
        }

        impl Mnemonic {
            /// Whether this mnemonic is a directive (or definition) rather than an instruction.
            ///
            /// Directives do not execute. Stepping over them only advances the PC.
            pub fn is_directive(&self) -> bool {
                matches!(self, $(Self::$dir)|+)
            }
        }

        impl std::str::FromStr for Mnemonic {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let upper = s.to_ascii_uppercase();
                match &*upper {
                    $(stringify!($dir) => Ok(Self::$dir)),*,
                    $(stringify!($instr) => Ok(Self::$instr)),*,
                    _ => Ok(Self::Other(upper))
                }
            }
        }

        impl std::fmt::Display for Mnemonic {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$dir => f.write_str(stringify!($dir))),*,
                    $(Self::$instr => f.write_str(stringify!($instr))),*,
                    Self::Other(m) => f.write_str(m)
                }
            }
        }
    };
}
mnemonic_enum! {
    directives: [ORG, EQU, END, DB],
    instructions: [
        MOV, ADD, ADDC, SUBB, INC, DEC, MUL, DIV, ANL, ORL, XRL,
        CLR, SETB, CPL, RL, RLC, RR, RRC, SWAP, XCH,
        SJMP, LJMP, AJMP, JMP, JC, JNC, JZ, JNZ, JB, JNB, JBC, CJNE, DJNZ,
        ACALL, LCALL, CALL, RET, RETI, PUSH, POP, NOP
    ]
}

/// A direct (byte) address operand.
///
/// ## Examples
/// ```text
/// MOV 30H, A
///     ~~~
/// MOV TMOD, #01H
///     ~~~~
/// MOV COUNT, #0
///     ~~~~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Direct {
    /// A named special function register.
    Sfr(u8),
    /// A numeric or symbolic address, resolved when executed.
    Expr(String),
}
impl std::fmt::Display for Direct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direct::Sfr(addr) => match sfr::name_of(*addr) {
                Some(name) => f.write_str(name),
                None => write!(f, "{addr:02X}H"),
            },
            Direct::Expr(e) => f.write_str(e),
        }
    }
}

/// A bit address operand.
///
/// ## Examples
/// ```text
/// SETB TR0
///      ~~~
/// CPL P1.0
///     ~~~~
/// MOV C, 20H.3
///        ~~~~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum BitAddr {
    /// An absolute bit address (from a named bit such as `TR0` or `C`).
    Named(u8),
    /// A `BASE.n` bit, where the byte comes from a direct address.
    Field {
        /// The byte holding the bit.
        base: Direct,
        /// The bit within the byte (0-7).
        bit: u8
    },
}
impl std::fmt::Display for BitAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitAddr::Named(b) => match sfr::bit_name_of(*b) {
                Some(name) => f.write_str(name),
                None => write!(f, "{b:02X}H"),
            },
            BitAddr::Field { base, bit } => write!(f, "{base}.{bit}"),
        }
    }
}

/// An operand of an instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Operand {
    /// The accumulator (`A`).
    Acc,
    /// The `A`/`B` register pair of `MUL AB` and `DIV AB`.
    AB,
    /// The 16-bit data pointer.
    Dptr,
    /// A banked register (`R0`-`R7`).
    Reg(Reg),
    /// A byte addressed by `R0` or `R1` (`@R0`, `@R1`).
    Indirect(Reg),
    /// An immediate value (`#...`), held as its text without the marker.
    Imm(String),
    /// A bit address.
    Bit(BitAddr),
    /// The complement of a bit (`/bit`), as in `ANL C, /P1.0`.
    NotBit(BitAddr),
    /// A direct address, or a label for jumps and calls.
    Direct(Direct),
}
impl Operand {
    /// Whether this operand is the accumulator.
    pub fn is_acc(&self) -> bool {
        matches!(self, Operand::Acc)
    }
    /// Whether this operand is the carry bit.
    pub fn is_carry(&self) -> bool {
        matches!(self, Operand::Bit(BitAddr::Named(sfr::CY_BIT)))
    }
}
impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Acc => f.write_char('A'),
            Operand::AB => f.write_str("AB"),
            Operand::Dptr => f.write_str("DPTR"),
            Operand::Reg(r) => r.fmt(f),
            Operand::Indirect(r) => write!(f, "@{r}"),
            Operand::Imm(imm) => write!(f, "#{imm}"),
            Operand::Bit(b) => b.fmt(f),
            Operand::NotBit(b) => write!(f, "/{b}"),
            Operand::Direct(d) => d.fmt(f),
        }
    }
}

/// A single parsed line of source.
///
/// A line with no mnemonic (e.g., a bare label) is still part of the program,
/// so that each line's index in the program matches its position in the source.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct ParsedLine {
    /// The label defined on this line.
    ///
    /// For `EQU`, this is the name of the constant.
    pub label: Option<String>,
    /// The mnemonic of this line, if present.
    pub mnemonic: Option<Mnemonic>,
    /// The operands of this line, in order.
    pub operands: Vec<Operand>,
    /// The 0-based index of this line in the source.
    pub line_no: usize,
}
impl ParsedLine {
    /// Whether stepping onto this line executes an instruction.
    pub fn is_executable(&self) -> bool {
        self.mnemonic.as_ref().is_some_and(|m| !m.is_directive())
    }

    /// Renders the mnemonic and operands of this line, without its label.
    pub fn instruction(&self) -> Instruction<'_> {
        Instruction(self)
    }
}
impl std::fmt::Display for ParsedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{label}: ")?;
        }
        std::fmt::Display::fmt(&self.instruction(), f)
    }
}

/// The mnemonic and operands of a [`ParsedLine`] (see [`ParsedLine::instruction`]).
#[derive(Debug, Clone, Copy)]
pub struct Instruction<'a>(&'a ParsedLine);
impl std::fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ParsedLine { mnemonic, operands, .. } = self.0;
        if let Some(m) = mnemonic {
            write!(f, "{m}")?;
        }
        for (i, op) in operands.iter().enumerate() {
            match i {
                0 => write!(f, " {op}")?,
                _ => write!(f, ", {op}")?,
            }
        }
        Ok(())
    }
}
