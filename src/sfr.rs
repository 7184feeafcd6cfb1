//! Special function registers (SFRs).
//!
//! The upper half of internal data memory (`0x80..=0xFF`) is the SFR space.
//! Each register here has a fixed address and name. This module holds those
//! addresses, the name lookup used by the parser ([`by_name`], [`bit_by_name`]),
//! and the masks for the control bits the simulator reacts to.

/// Port 0 latch.
pub const P0: u8 = 0x80;
/// Stack pointer.
pub const SP: u8 = 0x81;
/// Data pointer low byte.
pub const DPL: u8 = 0x82;
/// Data pointer high byte.
pub const DPH: u8 = 0x83;
/// Power control.
pub const PCON: u8 = 0x87;
/// Timer/counter control.
pub const TCON: u8 = 0x88;
/// Timer/counter mode.
pub const TMOD: u8 = 0x89;
/// Timer 0 low byte.
pub const TL0: u8 = 0x8A;
/// Timer 1 low byte.
pub const TL1: u8 = 0x8B;
/// Timer 0 high byte.
pub const TH0: u8 = 0x8C;
/// Timer 1 high byte.
pub const TH1: u8 = 0x8D;
/// Port 1 latch.
pub const P1: u8 = 0x90;
/// Serial control.
pub const SCON: u8 = 0x98;
/// Serial data buffer.
pub const SBUF: u8 = 0x99;
/// Port 2 latch.
pub const P2: u8 = 0xA0;
/// Interrupt enable.
pub const IE: u8 = 0xA8;
/// Port 3 latch.
pub const P3: u8 = 0xB0;
/// Interrupt priority.
pub const IP: u8 = 0xB8;
/// Program status word.
pub const PSW: u8 = 0xD0;
/// Accumulator.
pub const ACC: u8 = 0xE0;
/// B register.
pub const B: u8 = 0xF0;

/// The bit address of the carry flag (`PSW.7`).
pub const CY_BIT: u8 = 0xD7;

const NAMES: &[(&str, u8)] = &[
    ("P0", P0), ("SP", SP), ("DPL", DPL), ("DPH", DPH), ("PCON", PCON),
    ("TCON", TCON), ("TMOD", TMOD), ("TL0", TL0), ("TL1", TL1), ("TH0", TH0), ("TH1", TH1),
    ("P1", P1), ("SCON", SCON), ("SBUF", SBUF), ("P2", P2), ("IE", IE),
    ("P3", P3), ("IP", IP), ("PSW", PSW), ("ACC", ACC), ("B", B),
];

// Named bits, as absolute bit addresses.
const BIT_NAMES: &[(&str, u8)] = &[
    // PSW
    ("C", 0xD7), ("CY", 0xD7), ("AC", 0xD6), ("F0", 0xD5), ("RS1", 0xD4),
    ("RS0", 0xD3), ("OV", 0xD2), ("P", 0xD0),
    // TCON
    ("TF1", 0x8F), ("TR1", 0x8E), ("TF0", 0x8D), ("TR0", 0x8C),
    ("IE1", 0x8B), ("IT1", 0x8A), ("IE0", 0x89), ("IT0", 0x88),
    // SCON
    ("SM0", 0x9F), ("SM1", 0x9E), ("SM2", 0x9D), ("REN", 0x9C),
    ("TB8", 0x9B), ("RB8", 0x9A), ("TI", 0x99), ("RI", 0x98),
    // IE
    ("EA", 0xAF), ("ES", 0xAC), ("ET1", 0xAB), ("EX1", 0xAA), ("ET0", 0xA9), ("EX0", 0xA8),
    // IP
    ("PS", 0xBC), ("PT1", 0xBB), ("PX1", 0xBA), ("PT0", 0xB9), ("PX0", 0xB8),
];

/// Looks up an SFR address by its name (case-insensitive).
pub fn by_name(name: &str) -> Option<u8> {
    NAMES.iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, addr)| addr)
}

/// Gets the name of the SFR at the given address, if there is one.
pub fn name_of(addr: u8) -> Option<&'static str> {
    NAMES.iter()
        .find(|&&(_, a)| a == addr)
        .map(|&(n, _)| n)
}

/// Looks up a named bit (e.g., `TR0`, `EA`, `C`) and returns its bit address.
pub fn bit_by_name(name: &str) -> Option<u8> {
    BIT_NAMES.iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, bit)| bit)
}

/// Gets the name of the bit at the given bit address, if it is named.
///
/// `C` is preferred over `CY` for the carry bit.
pub fn bit_name_of(bit: u8) -> Option<&'static str> {
    BIT_NAMES.iter()
        .find(|&&(_, b)| b == bit)
        .map(|&(n, _)| n)
}

/// Bit masks within `TCON`.
pub mod tcon {
    #![allow(missing_docs)]
    pub const TF1: u8 = 0x80;
    pub const TR1: u8 = 0x40;
    pub const TF0: u8 = 0x20;
    pub const TR0: u8 = 0x10;
    pub const IE1: u8 = 0x08;
    pub const IT1: u8 = 0x04;
    pub const IE0: u8 = 0x02;
    pub const IT0: u8 = 0x01;
}

/// Bit masks within `SCON`.
pub mod scon {
    #![allow(missing_docs)]
    pub const TI: u8 = 0x02;
    pub const RI: u8 = 0x01;
}

/// Bit masks within `IE`.
///
/// `IP` uses the same positions for each source's priority bit.
pub mod ie {
    #![allow(missing_docs)]
    pub const EA: u8 = 0x80;
    pub const ES: u8 = 0x10;
    pub const ET1: u8 = 0x08;
    pub const EX1: u8 = 0x04;
    pub const ET0: u8 = 0x02;
    pub const EX0: u8 = 0x01;
}
