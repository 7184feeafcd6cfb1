//! Machine state for the 8051 simulator.
//!
//! This module consists of:
//! - [`MemArray`]: The 256 bytes of internal data memory (including the SFR space).
//! - [`Psw`]: A view over the program status word.
//! - [`Machine`]: The full machine state (memory, PC, cycle count, serial transmitter).
//!
//! The accumulator, B, PSW, SP, and DPTR are stored *only* in memory at their SFR addresses.
//! [`Machine`] exposes named accessors that read and write those bytes,
//! so a register and its SFR byte cannot disagree.

use rand::rngs::StdRng;
use rand::Rng;

use crate::ast::Reg;
use crate::sfr;

use super::device::serial::SerialTx;

/// Internal data memory (256 bytes).
///
/// Bytes `0x00..=0x7F` are RAM (register banks, bit-addressable region, scratch and stack).
/// Bytes `0x80..=0xFF` are the SFRs.
///
/// This can be indexed with a `u8` address.
#[derive(Clone, PartialEq, Eq)]
pub struct MemArray([u8; 256]);
impl MemArray {
    /// Creates memory with the low 128 bytes generated by the filler and the SFRs zeroed.
    pub fn new(filler: &mut impl ByteFiller) -> Self {
        let mut mem = [0; 256];
        for b in &mut mem[..0x80] {
            *b = filler.generate();
        }
        Self(mem)
    }

    /// The raw bytes of memory.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}
impl std::ops::Index<u8> for MemArray {
    type Output = u8;

    fn index(&self, index: u8) -> &Self::Output {
        &self.0[usize::from(index)]
    }
}
impl std::ops::IndexMut<u8> for MemArray {
    fn index_mut(&mut self, index: u8) -> &mut Self::Output {
        &mut self.0[usize::from(index)]
    }
}
impl std::fmt::Debug for MemArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 256 numbers is not useful debug output, so only show the nonzero bytes.
        f.debug_map()
            .entries(self.0.iter().enumerate().filter(|(_, &b)| b != 0))
            .finish()
    }
}

/// Trait that describes types that can be used to create the initial bytes of RAM.
pub trait ByteFiller {
    /// Generate a byte.
    fn generate(&mut self) -> u8;
}
impl ByteFiller for () {
    /// This creates unseeded, non-deterministic values.
    fn generate(&mut self) -> u8 {
        rand::random()
    }
}
impl ByteFiller for u8 {
    /// Sets each byte to the given value.
    fn generate(&mut self) -> u8 {
        *self
    }
}
impl ByteFiller for StdRng {
    /// This creates values from the standard random number generator.
    ///
    /// This can be used to create deterministic, seeded values.
    fn generate(&mut self) -> u8 {
        self.gen()
    }
}

/// Strategy used to initialize RAM (`0x00..=0x7F`) when a program is loaded or reset.
///
/// SFRs always start at their reset values regardless of this strategy.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MachineInitStrategy {
    /// Initializes each byte randomly and non-deterministically.
    Unseeded,

    /// Initializes each byte randomly and deterministically.
    Seeded {
        /// The seed the RNG was initialized with.
        seed: u64
    },

    /// Initializes each byte to a known value.
    Known {
        /// The value to initialize each byte to.
        value: u8
    }
}
impl Default for MachineInitStrategy {
    fn default() -> Self {
        MachineInitStrategy::Known { value: 0 }
    }
}
impl MachineInitStrategy {
    pub(super) fn generator(&self) -> impl ByteFiller {
        use rand::SeedableRng;

        match self {
            MachineInitStrategy::Unseeded => MIGenerator::Unseeded,
            MachineInitStrategy::Seeded { seed } => MIGenerator::Seeded(Box::new(StdRng::seed_from_u64(*seed))),
            MachineInitStrategy::Known { value } => MIGenerator::Known(*value),
        }
    }
}

enum MIGenerator {
    Unseeded,
    Seeded(Box<StdRng>),
    Known(u8)
}
impl ByteFiller for MIGenerator {
    fn generate(&mut self) -> u8 {
        match self {
            MIGenerator::Unseeded  => ().generate(),
            MIGenerator::Seeded(r) => r.generate(),
            MIGenerator::Known(k)  => k.generate(),
        }
    }
}

/// A wrapper over `u8` in order to facilitate the PSW.
///
/// ```text
/// bit:  7    6    5    4     3     2    1    0
///       CY   AC   F0   RS1   RS0   OV   -    P
/// ```
///
/// `RS1:RS0` selects the register bank (0-3).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Psw(u8);

impl Psw {
    /// Carry.
    pub const CY: u8 = 0x80;
    /// Auxiliary carry (carry out of bit 3).
    pub const AC: u8 = 0x40;
    /// User flag 0.
    pub const F0: u8 = 0x20;
    /// Register bank select, high bit.
    pub const RS1: u8 = 0x10;
    /// Register bank select, low bit.
    pub const RS0: u8 = 0x08;
    /// Overflow.
    pub const OV: u8 = 0x04;
    /// Parity of the accumulator (set if odd).
    pub const P: u8 = 0x01;

    /// Creates a PSW from its bits.
    pub fn new(bits: u8) -> Self {
        Psw(bits)
    }
    /// Gets the bit-representation of the PSW.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Checks whether every bit of the mask is set.
    pub fn flag(self, mask: u8) -> bool {
        self.0 & mask == mask
    }
    /// Sets or clears the bits of the mask.
    pub fn set_flag(&mut self, mask: u8, value: bool) {
        match value {
            true  => self.0 |= mask,
            false => self.0 &= !mask,
        }
    }

    #[allow(missing_docs)]
    pub fn cy(self) -> bool { self.flag(Self::CY) }
    #[allow(missing_docs)]
    pub fn ac(self) -> bool { self.flag(Self::AC) }
    #[allow(missing_docs)]
    pub fn ov(self) -> bool { self.flag(Self::OV) }
    #[allow(missing_docs)]
    pub fn p(self) -> bool { self.flag(Self::P) }

    /// The selected register bank (0-3).
    pub fn bank(self) -> u8 {
        (self.0 & (Self::RS1 | Self::RS0)) >> 3
    }
    /// Selects a register bank (only the low 2 bits of `bank` are used).
    pub fn set_bank(&mut self, bank: u8) {
        self.0 = (self.0 & !(Self::RS1 | Self::RS0)) | ((bank & 0b11) << 3);
    }
}
impl std::fmt::Debug for Psw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        struct Flags(u8);

        impl std::fmt::Debug for Flags {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                for (mask, c) in [(Psw::CY, 'C'), (Psw::AC, 'A'), (Psw::F0, 'F'), (Psw::OV, 'O'), (Psw::P, 'P')] {
                    if self.0 & mask != 0 { f.write_char(c)?; }
                }
                Ok(())
            }
        }

        f.debug_struct("Psw")
            .field("bank", &self.bank())
            .field("flags", &Flags(self.0))
            .finish()
    }
}

/// Computes the PSW parity bit for a value (set if the number of 1 bits is odd).
pub fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 1
}

/// The location of a single bit in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitLoc {
    /// The byte holding the bit.
    pub byte: u8,
    /// The bit within the byte (0-7).
    pub bit: u8,
}
impl BitLoc {
    /// Locates a bit by its absolute bit address.
    ///
    /// - Bits `0..=127` are in the bit-addressable RAM region: byte `0x20 + n / 8`.
    /// - Bits `128..=255` are in bit-addressable SFRs: byte `n & 0xF8`.
    ///
    /// ```
    /// use i8051_ensemble::sim::mem::BitLoc;
    ///
    /// assert_eq!(BitLoc::from_bit_addr(0x0B), BitLoc { byte: 0x21, bit: 3 });
    /// assert_eq!(BitLoc::from_bit_addr(0xD7), BitLoc { byte: 0xD0, bit: 7 });
    /// ```
    pub fn from_bit_addr(n: u8) -> Self {
        let byte = match n {
            0..=0x7F => 0x20 + n / 8,
            _ => n & 0xF8,
        };
        BitLoc { byte, bit: n % 8 }
    }

    /// The mask of this bit within its byte.
    pub fn mask(self) -> u8 {
        1 << (self.bit & 0b111)
    }
}

/// The state of the machine.
///
/// A `Machine` is created whole on every load and reset, and is
/// replaced whole by each step (see [`Simulator`]).
///
/// [`Simulator`]: super::Simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    /// Internal data memory, including the SFRs.
    pub mem: MemArray,
    /// The program counter, as an index into the program's lines.
    pub pc: usize,
    /// Machine cycles executed since the last load or reset.
    pub cycles: u64,
    /// The serial transmitter.
    pub serial: SerialTx,
    /// Whether an interrupt service routine is running (until its `RETI`).
    pub(crate) in_interrupt: bool,
}
impl Machine {
    /// Creates a machine in its reset state, with the PC at `entry`.
    pub fn new(init: MachineInitStrategy, entry: usize) -> Self {
        let mut mem = MemArray::new(&mut init.generator());
        for port in [sfr::P0, sfr::P1, sfr::P2, sfr::P3] {
            mem[port] = 0xFF;
        }
        mem[sfr::SP] = 0x07;

        Machine {
            mem,
            pc: entry,
            cycles: 0,
            serial: SerialTx::default(),
            in_interrupt: false,
        }
    }

    #[allow(missing_docs)]
    pub fn acc(&self) -> u8 { self.mem[sfr::ACC] }
    #[allow(missing_docs)]
    pub fn set_acc(&mut self, value: u8) { self.mem[sfr::ACC] = value; }
    #[allow(missing_docs)]
    pub fn b(&self) -> u8 { self.mem[sfr::B] }
    #[allow(missing_docs)]
    pub fn set_b(&mut self, value: u8) { self.mem[sfr::B] = value; }
    #[allow(missing_docs)]
    pub fn psw(&self) -> Psw { Psw(self.mem[sfr::PSW]) }
    #[allow(missing_docs)]
    pub fn set_psw(&mut self, psw: Psw) { self.mem[sfr::PSW] = psw.0; }
    #[allow(missing_docs)]
    pub fn sp(&self) -> u8 { self.mem[sfr::SP] }
    #[allow(missing_docs)]
    pub fn set_sp(&mut self, value: u8) { self.mem[sfr::SP] = value; }

    /// The 16-bit data pointer (`DPH:DPL`).
    pub fn dptr(&self) -> u16 {
        u16::from_be_bytes([self.mem[sfr::DPH], self.mem[sfr::DPL]])
    }
    /// Sets the 16-bit data pointer (`DPH:DPL`).
    pub fn set_dptr(&mut self, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.mem[sfr::DPH] = hi;
        self.mem[sfr::DPL] = lo;
    }

    /// The carry flag.
    pub fn carry(&self) -> bool {
        self.psw().cy()
    }
    /// Sets the carry flag.
    pub fn set_carry(&mut self, value: bool) {
        self.update_psw(|psw| psw.set_flag(Psw::CY, value));
    }
    /// Edits the PSW in place.
    pub fn update_psw(&mut self, f: impl FnOnce(&mut Psw)) {
        let mut psw = self.psw();
        f(&mut psw);
        self.set_psw(psw);
    }
    /// Recomputes the parity flag from the accumulator.
    pub fn update_parity(&mut self) {
        let p = parity(self.acc());
        self.update_psw(|psw| psw.set_flag(Psw::P, p));
    }

    /// The memory address of a register in the selected bank.
    pub fn reg_addr(&self, reg: Reg) -> u8 {
        self.psw().bank() * 8 + reg.reg_no()
    }
    /// Reads a register from the selected bank.
    pub fn reg(&self, reg: Reg) -> u8 {
        self.mem[self.reg_addr(reg)]
    }
    /// Writes a register in the selected bank.
    pub fn set_reg(&mut self, reg: Reg, value: u8) {
        let addr = self.reg_addr(reg);
        self.mem[addr] = value;
    }
    /// All registers (`R0`-`R7`) of the selected bank.
    pub fn banked_regs(&self) -> [u8; 8] {
        let base = self.psw().bank() * 8;
        std::array::from_fn(|i| self.mem[base + i as u8])
    }

    /// Reads a single bit.
    pub fn bit(&self, loc: BitLoc) -> bool {
        self.mem[loc.byte] & loc.mask() != 0
    }
    /// Writes a single bit.
    pub fn set_bit(&mut self, loc: BitLoc, value: bool) {
        match value {
            true  => self.mem[loc.byte] |= loc.mask(),
            false => self.mem[loc.byte] &= !loc.mask(),
        }
    }

    /// Pushes a byte: SP is incremented, then the byte is written at SP.
    pub fn push(&mut self, value: u8) {
        let sp = self.sp().wrapping_add(1);
        self.set_sp(sp);
        self.mem[sp] = value;
    }
    /// Pops a byte: the byte is read at SP, then SP is decremented.
    pub fn pop(&mut self) -> u8 {
        let sp = self.sp();
        let value = self.mem[sp];
        self.set_sp(sp.wrapping_sub(1));
        value
    }

    /// Whether an interrupt service routine is currently running.
    pub fn in_interrupt(&self) -> bool {
        self.in_interrupt
    }
}
