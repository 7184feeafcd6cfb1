//! On-chip peripherals of the 8051.
//!
//! These advance after every executed instruction by that instruction's cycle cost.
//!
//! The peripherals here are:
//! - [`timer`]: Timers 0 and 1 (configured by `TMOD`, run by `TCON`).
//! - [`serial`]: The serial transmitter (`SBUF`, `SCON`).
//!
//! Both keep their configuration and counters in SFRs, so a program drives them
//! with ordinary writes.

pub mod timer;
pub mod serial;

use super::mem::Machine;

/// Advances every peripheral by `cycles` machine cycles.
///
/// `wrote_sbuf` is whether the instruction that just ran wrote `SBUF`.
/// If a serial transmission completed, this returns the transmitted byte.
pub(crate) fn tick(m: &mut Machine, cycles: u32, wrote_sbuf: bool) -> Option<u8> {
    timer::tick(&mut m.mem, cycles);
    m.serial.tick(&mut m.mem, cycles, wrote_sbuf)
}
