//! Utilities to debug simulation.
//!
//! The key type here is [`Breakpoint`], which can be inserted into the [`Simulator`]'s
//! breakpoint set to pause a run once its condition holds.
//!
//! ```
//! use i8051_ensemble::asm::assemble;
//! use i8051_ensemble::sim::Simulator;
//! use i8051_ensemble::sim::debug::{Breakpoint, Comparator};
//!
//! let program = assemble("
//!         MOV A, #0
//! LOOP:   INC A
//!         SJMP LOOP
//! ").unwrap();
//!
//! let mut sim = Simulator::new(Default::default());
//! sim.load(program);
//! sim.breakpoints.insert(Breakpoint::Acc(Comparator::Ge(10)));
//! sim.run_with_limit(1000).unwrap();
//!
//! assert!(sim.hit_breakpoint());
//! assert_eq!(sim.machine().acc(), 10);
//! ```
use std::fmt::Write;

use crate::ast::Reg;

use super::Simulator;

/// Common breakpoints.
#[derive(PartialEq, Eq, Hash, Clone)]
pub enum Breakpoint {
    /// Break when the PC is at the given line.
    Line(usize),

    /// Break when the accumulator matches.
    Acc(Comparator),

    /// Break when the provided register (in the selected bank) matches.
    Reg {
        /// Register to check.
        reg: Reg,
        /// Predicate to break against.
        value: Comparator
    },
    /// Break when the byte at the provided address matches.
    Mem {
        /// Address to check.
        addr: u8,
        /// Predicate to break against.
        value: Comparator
    },
}

impl Breakpoint where Breakpoint: Send + Sync { /* assert Breakpoint is send/sync */ }

impl Breakpoint {
    /// Checks if a break should occur.
    pub fn check(&self, sim: &Simulator) -> bool {
        let m = sim.machine();
        match self {
            Breakpoint::Line(line) => *line == m.pc,
            Breakpoint::Acc(cmp) => cmp.check(m.acc()),
            Breakpoint::Reg { reg, value: cmp } => cmp.check(m.reg(*reg)),
            Breakpoint::Mem { addr, value: cmp } => cmp.check(m.mem[*addr]),
        }
    }
}
impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Line(line) => write!(f, "line {}", line + 1),
            Self::Acc(value) => write!(f, "A {value}"),
            Self::Reg { reg, value } => write!(f, "{reg} {value}"),
            Self::Mem { addr, value } => write!(f, "mem[{addr:02X}H] {value}"),
        }
    }
}
impl std::fmt::Debug for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Breakpoint(")?;
        std::fmt::Display::fmt(self, f)?;
        f.write_char(')')
    }
}

/// Predicate checking a byte against a value.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum Comparator {
    /// Never breaks.
    Never,
    /// Break if the current value is less than the provided value.
    Lt(u8),
    /// Break if the current value is equal to the provided value.
    Eq(u8),
    /// Break if the current value is less than or equal to the provided value.
    Le(u8),
    /// Break if the current value is greater than the provided value.
    Gt(u8),
    /// Break if the current value is not equal to the provided value.
    Ne(u8),
    /// Break if the current value is greater than or equal to the provided value.
    Ge(u8),
    /// Always breaks.
    Always
}
impl Comparator {
    /// Checks if the operand passes the comparator.
    pub fn check(&self, operand: u8) -> bool {
        match *self {
            Comparator::Never  => false,
            Comparator::Lt(r)  => operand < r,
            Comparator::Eq(r)  => operand == r,
            Comparator::Le(r)  => operand <= r,
            Comparator::Gt(r)  => operand > r,
            Comparator::Ne(r)  => operand != r,
            Comparator::Ge(r)  => operand >= r,
            Comparator::Always => true,
        }
    }
}
impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparator::Never  => f.write_str("never"),
            Comparator::Lt(r)  => write!(f, "< {r:02X}H"),
            Comparator::Eq(r)  => write!(f, "== {r:02X}H"),
            Comparator::Le(r)  => write!(f, "<= {r:02X}H"),
            Comparator::Gt(r)  => write!(f, "> {r:02X}H"),
            Comparator::Ne(r)  => write!(f, "!= {r:02X}H"),
            Comparator::Ge(r)  => write!(f, ">= {r:02X}H"),
            Comparator::Always => f.write_str("always"),
        }
    }
}
