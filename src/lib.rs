//! An 8051 assembly parser and instruction-level simulator.
//!
//! This is meant to be a general suite to run 8051-family assembly:
//! the core registers and internal memory, the timers, the serial transmitter, and the interrupt controller.
//!
//! # Usage
//!
//! Source code is loaded into a [`Program`], one parsed entry per source line:
//! ```
//! use i8051_ensemble::asm::assemble;
//!
//! let code = "
//!     ORG 0000H
//! MAIN:
//!     MOV A, #10H
//!     SJMP MAIN
//! ";
//! let program = assemble(code).unwrap();
//! assert_eq!(program.symbols().code_label("MAIN"), Some(2));
//! ```
//!
//! Once a program has been loaded, it can be executed with the simulator:
//! ```
//! use i8051_ensemble::sim::Simulator;
//!
//! let mut simulator = Simulator::new(Default::default());
//! simulator.load_source("
//!     MOV SCON, #40H
//!     MOV SBUF, #'!'
//! WAIT:
//!     JNB TI, WAIT
//! ").unwrap();
//! simulator.run().unwrap(); // <-- Result can be handled accordingly
//!
//! assert_eq!(simulator.serial_output(), "!");
//! ```
//!
//! If more granularity is needed for simulation, there are also stepping functions
//! and a paced run loop. See the [`sim`] module for more details.
//!
//! [`Program`]: asm::Program
#![warn(missing_docs)]

pub mod sfr;
pub mod parse;
pub mod ast;
pub mod asm;
pub mod sim;
pub mod err;
