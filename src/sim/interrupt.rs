//! The interrupt controller.
//!
//! After every executed instruction, the controller checks for a pending interrupt
//! and services at most one. Interrupts are globally gated by `IE.EA`.
//!
//! Each source has an enable bit in `IE`, a pending flag, and a priority bit in `IP`
//! (at the same position as its enable bit). The highest-priority pending source wins;
//! ties are broken by the fixed precedence order [`InterruptSource::PRECEDENCE`].
//!
//! Servicing pushes the return line (high byte, then low byte), jumps to the source's vector,
//! and clears the source's flag. The serial flags (`RI`, `TI`) are left set;
//! the service routine has to clear them.
//!
//! While a service routine runs (until `RETI`), no other interrupt is taken.

use crate::sfr::{self, ie, scon, tcon};

use super::mem::{Machine, MemArray};

/// A source of interrupts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterruptSource {
    /// External interrupt 0 (`TCON.IE0`).
    Ext0,
    /// Timer 0 overflow (`TCON.TF0`).
    Timer0,
    /// External interrupt 1 (`TCON.IE1`).
    Ext1,
    /// Timer 1 overflow (`TCON.TF1`).
    Timer1,
    /// Serial port (`SCON.RI` or `SCON.TI`).
    Serial,
}
impl InterruptSource {
    /// Every source, in order of precedence.
    pub const PRECEDENCE: [InterruptSource; 5] = [
        InterruptSource::Ext0,
        InterruptSource::Timer0,
        InterruptSource::Ext1,
        InterruptSource::Timer1,
        InterruptSource::Serial,
    ];

    /// The code address this source vectors to.
    pub fn vector(self) -> u16 {
        match self {
            InterruptSource::Ext0   => 0x03,
            InterruptSource::Timer0 => 0x0B,
            InterruptSource::Ext1   => 0x13,
            InterruptSource::Timer1 => 0x1B,
            InterruptSource::Serial => 0x23,
        }
    }

    /// The mask of this source's enable bit in `IE` (and its priority bit in `IP`).
    pub fn enable_mask(self) -> u8 {
        match self {
            InterruptSource::Ext0   => ie::EX0,
            InterruptSource::Timer0 => ie::ET0,
            InterruptSource::Ext1   => ie::EX1,
            InterruptSource::Timer1 => ie::ET1,
            InterruptSource::Serial => ie::ES,
        }
    }

    /// The SFR holding this source's flag(s), and the mask of the flag(s).
    fn flag(self) -> (u8, u8) {
        match self {
            InterruptSource::Ext0   => (sfr::TCON, tcon::IE0),
            InterruptSource::Timer0 => (sfr::TCON, tcon::TF0),
            InterruptSource::Ext1   => (sfr::TCON, tcon::IE1),
            InterruptSource::Timer1 => (sfr::TCON, tcon::TF1),
            InterruptSource::Serial => (sfr::SCON, scon::RI | scon::TI),
        }
    }

    /// Whether this source is enabled and has its flag raised.
    ///
    /// This does not consider `IE.EA`.
    pub fn pending(self, mem: &MemArray) -> bool {
        let (addr, mask) = self.flag();
        mem[sfr::IE] & self.enable_mask() != 0 && mem[addr] & mask != 0
    }

    /// The priority level (0 or 1) of this source.
    pub fn priority(self, mem: &MemArray) -> u8 {
        u8::from(mem[sfr::IP] & self.enable_mask() != 0)
    }

    /// Clears the flag that triggered this source. The serial flags are left as is.
    fn clear(self, mem: &mut MemArray) {
        if self != InterruptSource::Serial {
            let (addr, mask) = self.flag();
            mem[addr] &= !mask;
        }
    }
}

/// Finds the source that would be serviced, if any.
///
/// ```
/// use i8051_ensemble::sfr::{self, ie, tcon};
/// use i8051_ensemble::sim::interrupt::{poll, InterruptSource};
/// use i8051_ensemble::sim::mem::MemArray;
///
/// let mut mem = MemArray::new(&mut 0u8);
/// mem[sfr::TCON] = tcon::TF0 | tcon::IE1;
/// mem[sfr::IE] = ie::EA | ie::ET0 | ie::EX1;
/// assert_eq!(poll(&mem), Some(InterruptSource::Timer0));
///
/// // raising INT1's priority lets it win
/// mem[sfr::IP] = ie::EX1;
/// assert_eq!(poll(&mem), Some(InterruptSource::Ext1));
/// ```
pub fn poll(mem: &MemArray) -> Option<InterruptSource> {
    if mem[sfr::IE] & ie::EA == 0 {
        return None;
    }

    let mut selected: Option<(InterruptSource, u8)> = None;
    for src in InterruptSource::PRECEDENCE {
        if !src.pending(mem) { continue; }

        let priority = src.priority(mem);
        // Strictly greater, so earlier sources win ties.
        if selected.map_or(true, |(_, p)| priority > p) {
            selected = Some((src, priority));
        }
    }

    selected.map(|(src, _)| src)
}

/// Services the selected interrupt, if any.
///
/// `vector_line` maps a vector address to the program line to jump to.
pub(crate) fn service(m: &mut Machine, vector_line: impl FnOnce(u16) -> usize) -> Option<InterruptSource> {
    if m.in_interrupt { return None; }
    let src = poll(&m.mem)?;

    let [hi, lo] = (m.pc as u16).to_be_bytes();
    m.push(hi);
    m.push(lo);

    let vector = src.vector();
    m.pc = vector_line(vector);
    src.clear(&mut m.mem);
    m.in_interrupt = true;

    log::debug!("servicing {src:?} interrupt (vector {vector:#04X}, line {})", m.pc);
    Some(src)
}
