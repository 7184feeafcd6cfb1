//! Property-based tests for machine invariants.
//!
//! These tests run small generated programs through the simulator and check
//! flags, memory, and the stack against reference computations.

use i8051_ensemble::ast::Reg;
use i8051_ensemble::sim::exec::{add, subb};
use i8051_ensemble::sim::mem::Machine;
use i8051_ensemble::sim::Simulator;
use proptest::prelude::*;

/// Formats a byte as an assembly hex literal (e.g., `0FFH`).
fn hex(v: u8) -> String {
    format!("{v:03X}H")
}

/// Runs a program to completion and returns the final machine.
fn run(src: &str) -> Machine {
    let mut sim = Simulator::new(Default::default());
    sim.load_source(src).unwrap();
    sim.run_with_limit(10_000).unwrap();
    assert!(sim.hit_halt(), "program did not finish");
    sim.machine().clone()
}

#[test]
fn add_flags_exhaustive() {
    for a in 0..=255u8 {
        for v in 0..=255u8 {
            for carry in [false, true] {
                let r = add(a, v, carry);
                let c = i16::from(carry);

                let unsigned = i16::from(a) + i16::from(v) + c;
                let signed = i16::from(a as i8) + i16::from(v as i8) + c;

                assert_eq!(r.value, unsigned as u8, "{a:02X} + {v:02X} + {c}");
                assert_eq!(r.cy, unsigned > 0xFF, "CY of {a:02X} + {v:02X} + {c}");
                assert_eq!(r.ac, (a & 0xF) + (v & 0xF) + carry as u8 > 0xF, "AC of {a:02X} + {v:02X} + {c}");
                assert_eq!(r.ov, !(-128..=127).contains(&signed), "OV of {a:02X} + {v:02X} + {c}");
            }
        }
    }
}

#[test]
fn subb_flags_exhaustive() {
    for a in 0..=255u8 {
        for v in 0..=255u8 {
            for borrow in [false, true] {
                let r = subb(a, v, borrow);
                let c = i16::from(borrow);

                let unsigned = i16::from(a) - i16::from(v) - c;
                let signed = i16::from(a as i8) - i16::from(v as i8) - c;

                assert_eq!(r.value, unsigned as u8, "{a:02X} - {v:02X} - {c}");
                assert_eq!(r.cy, unsigned < 0, "CY of {a:02X} - {v:02X} - {c}");
                assert_eq!(r.ac, i16::from(a & 0xF) - i16::from(v & 0xF) - c < 0, "AC of {a:02X} - {v:02X} - {c}");
                assert_eq!(r.ov, !(-128..=127).contains(&signed), "OV of {a:02X} - {v:02X} - {c}");
            }
        }
    }
}

proptest! {
    #[test]
    fn parity_tracks_accumulator(v in any::<u8>(), w in any::<u8>()) {
        let m = run(&format!("MOV A, #{}", hex(v)));
        prop_assert_eq!(m.psw().p(), v.count_ones() % 2 == 1);

        let m = run(&format!("MOV A, #{}\nADD A, #{}", hex(v), hex(w)));
        prop_assert_eq!(m.psw().p(), m.acc().count_ones() % 2 == 1);

        // a write through the SFR address updates parity too
        let m = run(&format!("MOV 0E0H, #{}", hex(v)));
        prop_assert_eq!(m.acc(), v);
        prop_assert_eq!(m.psw().p(), v.count_ones() % 2 == 1);
    }

    #[test]
    fn add_in_program_matches_alu(a in any::<u8>(), v in any::<u8>(), carry in any::<bool>()) {
        let set_carry = if carry { "SETB C" } else { "CLR C" };
        let m = run(&format!("MOV A, #{}\n{set_carry}\nADDC A, #{}", hex(a), hex(v)));
        let r = add(a, v, carry);

        prop_assert_eq!(m.acc(), r.value);
        prop_assert_eq!(m.psw().cy(), r.cy);
        prop_assert_eq!(m.psw().ac(), r.ac);
        prop_assert_eq!(m.psw().ov(), r.ov);
    }

    #[test]
    fn push_pop_round_trip(addr in 0x30..=0x7Fu8, value in any::<u8>(), sp in 0x08..=0x2Eu8) {
        let m = run(&format!("
            MOV SP, #{sp}
            MOV {addr}, #{value}
            PUSH {addr}
            MOV {addr}, #0
            POP {addr}
        ", sp = hex(sp), addr = hex(addr), value = hex(value)));

        prop_assert_eq!(m.mem[addr], value);
        prop_assert_eq!(m.sp(), sp);
    }

    #[test]
    fn bank_switching_isolates_registers(bank in 1..4u8, reg in 0..8u8, value in any::<u8>()) {
        let m = run(&format!("
            MOV R{reg}, #0
            MOV PSW, #{psw}
            MOV R{reg}, #{value}
        ", psw = hex(bank << 3), value = hex(value)));

        let reg = Reg::try_from(reg).unwrap();
        prop_assert_eq!(m.reg(reg), value);
        prop_assert_eq!(m.mem[bank * 8 + reg.reg_no()], value);
        // bank 0's copy is untouched
        prop_assert_eq!(m.mem[reg.reg_no()], 0);
    }

    #[test]
    fn djnz_loops_n_times(n in 1..=255u8) {
        let m = run(&format!("
                    MOV R7, #{}
                    MOV A, #0
            LOOP:   INC A
                    DJNZ R7, LOOP
        ", hex(n)));
        prop_assert_eq!(m.acc(), n);
    }

    #[test]
    fn malformed_literals_resolve_to_zero(text in "[G-Z]{1,3}[0-9]{0,2}Q") {
        let m = run(&format!("MOV A, #55H\nMOV A, #{text}"));
        prop_assert_eq!(m.acc(), 0);
    }

    #[test]
    fn punctuated_literals_load_and_resolve_to_zero(text in "[0-9A-Z]{1,3}[+*()/%!&|]{1,2}[0-9A-Z]{0,3}") {
        let m = run(&format!("MOV A, #55H\nMOV A, #{text}\nMOV R1, #{text}"));
        prop_assert_eq!(m.acc(), 0);
        prop_assert_eq!(m.reg(Reg::try_from(1).unwrap()), 0);
    }
}
