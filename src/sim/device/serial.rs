//! The serial transmitter.
//!
//! Writing `SBUF` starts a transmission, which takes a number of machine cycles
//! set by the baud rate (see [`tx_cycles`]). While it is in flight, `SCON.TI` is clear.
//! When it completes, `TI` is set and the byte in `SBUF` is sent out.
//!
//! Only one transmission is in flight at a time. Writing `SBUF` again restarts it.
//!
//! Reception is driven externally (see [`Simulator::receive_serial`]).
//!
//! [`Simulator::receive_serial`]: crate::sim::Simulator::receive_serial

use crate::sfr::{self, scon, tcon};
use crate::sim::mem::MemArray;

/// Duration of a transmission (in machine cycles) when timer 1 is not running.
pub const FALLBACK_TX_CYCLES: i64 = 120;

/// The state of the serial transmitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SerialTx {
    pending: bool,
    remaining: i64,
}
impl SerialTx {
    /// Whether a transmission is in flight.
    pub fn pending(&self) -> bool {
        self.pending
    }
    /// The number of cycles left in the current transmission.
    ///
    /// This is not meaningful if no transmission is pending.
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Advances the transmitter by `cycles` machine cycles.
    ///
    /// If the pending transmission completes, this sets `TI` and returns the byte in `SBUF`.
    /// Then, if `wrote_sbuf` is set, a new transmission starts.
    pub(crate) fn tick(&mut self, mem: &mut MemArray, cycles: u32, wrote_sbuf: bool) -> Option<u8> {
        let mut sent = None;

        if self.pending {
            self.remaining -= i64::from(cycles);
            if self.remaining <= 0 {
                self.pending = false;
                mem[sfr::SCON] |= scon::TI;
                sent = Some(mem[sfr::SBUF]);
            }
        }

        if wrote_sbuf {
            self.pending = true;
            self.remaining = tx_cycles(mem);
            mem[sfr::SCON] &= !scon::TI;
        }

        sent
    }
}

/// The number of machine cycles one transmission takes with the current configuration.
///
/// This is `max(12, (256 - TH1) * 12)` if timer 1 is running (as the baud generator),
/// and [`FALLBACK_TX_CYCLES`] otherwise.
pub fn tx_cycles(mem: &MemArray) -> i64 {
    match mem[sfr::TCON] & tcon::TR1 != 0 {
        true  => ((256 - i64::from(mem[sfr::TH1])) * 12).max(12),
        false => FALLBACK_TX_CYCLES,
    }
}

#[cfg(test)]
mod tests {
    use crate::sfr::{self, scon, tcon};
    use crate::sim::mem::MemArray;

    use super::{tx_cycles, SerialTx, FALLBACK_TX_CYCLES};

    #[test]
    fn test_tx_cycles() {
        let mut mem = MemArray::new(&mut 0u8);
        assert_eq!(tx_cycles(&mem), FALLBACK_TX_CYCLES);

        mem[sfr::TCON] = tcon::TR1;
        mem[sfr::TH1] = 0xFD;
        assert_eq!(tx_cycles(&mem), 36);

        mem[sfr::TH1] = 0xFF;
        assert_eq!(tx_cycles(&mem), 12);
        mem[sfr::TH1] = 0x00;
        assert_eq!(tx_cycles(&mem), 256 * 12);
    }

    #[test]
    fn test_transmit() {
        let mut mem = MemArray::new(&mut 0u8);
        let mut tx = SerialTx::default();
        mem[sfr::SCON] = scon::TI;
        mem[sfr::SBUF] = b'H';

        assert_eq!(tx.tick(&mut mem, 1, true), None);
        assert!(tx.pending());
        assert_eq!(tx.remaining(), FALLBACK_TX_CYCLES);
        assert_eq!(mem[sfr::SCON] & scon::TI, 0);

        assert_eq!(tx.tick(&mut mem, 100, false), None);
        assert_eq!(tx.remaining(), 20);

        assert_eq!(tx.tick(&mut mem, 25, false), Some(b'H'));
        assert!(!tx.pending());
        assert_eq!(mem[sfr::SCON] & scon::TI, scon::TI);

        // nothing more is sent
        assert_eq!(tx.tick(&mut mem, 500, false), None);
    }

    #[test]
    fn test_restart() {
        let mut mem = MemArray::new(&mut 0u8);
        let mut tx = SerialTx::default();
        mem[sfr::SBUF] = b'a';
        tx.tick(&mut mem, 1, true);
        tx.tick(&mut mem, 100, false);

        // a second write restarts the countdown
        mem[sfr::SBUF] = b'b';
        assert_eq!(tx.tick(&mut mem, 1, true), None);
        assert_eq!(tx.remaining(), FALLBACK_TX_CYCLES);
    }
}
