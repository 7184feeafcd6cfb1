//! Timers 0 and 1.
//!
//! Each timer counts machine cycles while its run bit (`TR0`/`TR1` in `TCON`) is set.
//! The mode of each timer is the low 2 bits of its `TMOD` nibble:
//!
//! | mode | counter                                                       |
//! |------|---------------------------------------------------------------|
//! | 0    | 13-bit: `TH` (low 5 bits) and `TL`                              |
//! | 1    | 16-bit: `TH` and `TL`                                           |
//! | 2    | 8-bit `TL`, reloaded from `TH` on overflow                      |
//! | 3    | timer 0: `TL0` and `TH0` as two 8-bit counters; timer 1: stopped |
//!
//! On overflow, the timer's flag (`TF0`/`TF1`) is set.

use crate::sfr::{self, tcon};
use crate::sim::mem::MemArray;

/// One of the two timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    #[allow(missing_docs)]
    T0,
    #[allow(missing_docs)]
    T1,
}
impl Timer {
    fn run_mask(self) -> u8 {
        match self {
            Timer::T0 => tcon::TR0,
            Timer::T1 => tcon::TR1,
        }
    }
    fn overflow_mask(self) -> u8 {
        match self {
            Timer::T0 => tcon::TF0,
            Timer::T1 => tcon::TF1,
        }
    }
    fn regs(self) -> (u8, u8) {
        match self {
            Timer::T0 => (sfr::TL0, sfr::TH0),
            Timer::T1 => (sfr::TL1, sfr::TH1),
        }
    }

    /// The mode (0-3) this timer is configured to in `TMOD`.
    pub fn mode(self, tmod: u8) -> u8 {
        match self {
            Timer::T0 => tmod & 0b11,
            Timer::T1 => (tmod >> 4) & 0b11,
        }
    }
}

/// Advances both timers by `cycles` machine cycles.
pub fn tick(mem: &mut MemArray, cycles: u32) {
    tick_timer(mem, Timer::T0, cycles);
    tick_timer(mem, Timer::T1, cycles);
}

fn tick_timer(mem: &mut MemArray, timer: Timer, cycles: u32) {
    let mode = timer.mode(mem[sfr::TMOD]);
    let running = mem[sfr::TCON] & timer.run_mask() != 0;
    let (tl, th) = timer.regs();

    let overflowed = match (timer, mode) {
        // TH0 is its own counter in split mode, run by TR1 and flagged by TF1.
        (Timer::T0, 3) => {
            if mem[sfr::TCON] & tcon::TR1 != 0 && count8(&mut mem[th], cycles) {
                mem[sfr::TCON] |= tcon::TF1;
            }
            running && count8(&mut mem[tl], cycles)
        },
        (Timer::T1, 3) => false,
        _ if !running => false,
        (_, 0) => {
            let value = (u32::from(mem[th] & 0x1F) << 8 | u32::from(mem[tl])) + cycles;
            mem[th] = ((value >> 8) & 0x1F) as u8;
            mem[tl] = value as u8;
            value > 0x1FFF
        },
        (_, 1) => {
            let value = (u32::from(mem[th]) << 8 | u32::from(mem[tl])) + cycles;
            mem[th] = (value >> 8) as u8;
            mem[tl] = value as u8;
            value > 0xFFFF
        },
        _ => {
            // Mode 2. Each wrap reloads from TH, so the counter has to step.
            let reload = mem[th];
            let mut overflowed = false;
            for _ in 0..cycles {
                let (next, wrapped) = mem[tl].overflowing_add(1);
                mem[tl] = match wrapped {
                    true  => reload,
                    false => next,
                };
                overflowed |= wrapped;
            }
            overflowed
        },
    };

    if overflowed {
        mem[sfr::TCON] |= timer.overflow_mask();
    }
}

/// Advances an 8-bit counter, returning whether it wrapped.
fn count8(reg: &mut u8, cycles: u32) -> bool {
    let value = u32::from(*reg) + cycles;
    *reg = value as u8;
    value > 0xFF
}

#[cfg(test)]
mod tests {
    use crate::sfr::{self, tcon};
    use crate::sim::mem::MemArray;

    use super::tick;

    fn mem(tmod: u8, control: u8) -> MemArray {
        let mut mem = MemArray::new(&mut 0u8);
        mem[sfr::TMOD] = tmod;
        mem[sfr::TCON] = control;
        mem
    }

    #[test]
    fn test_stopped_timer_holds() {
        let mut m = mem(0x11, 0);
        m[sfr::TL0] = 0xFE;
        tick(&mut m, 10);
        assert_eq!(m[sfr::TL0], 0xFE);
        assert_eq!(m[sfr::TCON], 0);
    }

    #[test]
    fn test_mode0() {
        let mut m = mem(0x00, tcon::TR0);
        m[sfr::TH0] = 0x1F;
        m[sfr::TL0] = 0xFE;
        tick(&mut m, 1);
        assert_eq!((m[sfr::TH0], m[sfr::TL0]), (0x1F, 0xFF));
        assert_eq!(m[sfr::TCON] & tcon::TF0, 0);

        tick(&mut m, 3);
        assert_eq!((m[sfr::TH0], m[sfr::TL0]), (0x00, 0x02));
        assert_ne!(m[sfr::TCON] & tcon::TF0, 0);
    }

    #[test]
    fn test_mode1() {
        let mut m = mem(0x10, tcon::TR1);
        m[sfr::TH1] = 0xFF;
        m[sfr::TL1] = 0xF0;
        tick(&mut m, 0x0F);
        assert_eq!((m[sfr::TH1], m[sfr::TL1]), (0xFF, 0xFF));
        assert_eq!(m[sfr::TCON] & tcon::TF1, 0);

        tick(&mut m, 2);
        assert_eq!((m[sfr::TH1], m[sfr::TL1]), (0x00, 0x01));
        assert_eq!(m[sfr::TCON] & tcon::TF1, tcon::TF1);
        // timer 0 is not running
        assert_eq!(m[sfr::TCON] & tcon::TF0, 0);
    }

    #[test]
    fn test_mode2_reload() {
        let mut m = mem(0x02, tcon::TR0);
        m[sfr::TH0] = 0xF6;
        m[sfr::TL0] = 0xFE;
        tick(&mut m, 4);
        assert_eq!(m[sfr::TL0], 0xF6 + 2);
        assert_eq!(m[sfr::TH0], 0xF6);
        assert_ne!(m[sfr::TCON] & tcon::TF0, 0);
    }

    #[test]
    fn test_mode2_multiple_wraps() {
        let mut m = mem(0x20, tcon::TR1);
        m[sfr::TH1] = 0xFD;
        m[sfr::TL1] = 0xFD;
        // 3 cycles to wrap, then 3 per wrap after
        tick(&mut m, 8);
        assert_eq!(m[sfr::TL1], 0xFF);
        assert_ne!(m[sfr::TCON] & tcon::TF1, 0);
    }

    #[test]
    fn test_mode3_split() {
        let mut m = mem(0x03, tcon::TR0 | tcon::TR1);
        m[sfr::TL0] = 0xFF;
        m[sfr::TH0] = 0x10;
        tick(&mut m, 1);
        assert_eq!(m[sfr::TL0], 0x00);
        assert_eq!(m[sfr::TH0], 0x11);
        assert_eq!(m[sfr::TCON] & (tcon::TF0 | tcon::TF1), tcon::TF0);

        m[sfr::TH0] = 0xFF;
        tick(&mut m, 1);
        assert_ne!(m[sfr::TCON] & tcon::TF1, 0);
    }

    #[test]
    fn test_timer1_mode3_holds() {
        let mut m = mem(0x30, tcon::TR1);
        m[sfr::TL1] = 0xFF;
        tick(&mut m, 5);
        assert_eq!(m[sfr::TL1], 0xFF);
        assert_eq!(m[sfr::TCON] & tcon::TF1, 0);
    }
}
