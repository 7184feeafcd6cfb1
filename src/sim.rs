//! Simulating and execution for 8051 assembly.
//!
//! This module is focused on executing a loaded [`Program`].
//!
//! This module consists of:
//! - [`Simulator`]: The struct that simulates a program.
//! - [`mem`]: The module handling machine state (memory, registers, PSW).
//! - [`exec`]: The module handling instruction semantics.
//! - [`cycles`]: The module handling instruction cycle costs.
//! - [`device`]: The module handling the on-chip timers and serial port.
//! - [`interrupt`]: The module handling the interrupt controller.
//! - [`debug`]: The module handling types of breakpoints for the simulator.
//! - [`runner`]: The module handling continuous, paced execution on a worker thread.
//!
//! # Usage
//!
//! To simulate some code, you need to instantiate a Simulator and load source into it:
//!
//! ```
//! use i8051_ensemble::sim::Simulator;
//!
//! let mut sim = Simulator::new(Default::default());
//! sim.load_source("
//!     MOV A, #05H
//!     MOV B, #03H
//!     MUL AB
//! ").unwrap();
//!
//! // Running step by step:
//! sim.step_in().unwrap();
//! assert_eq!(sim.machine().acc(), 0x05);
//! sim.step_in().unwrap();
//! sim.step_in().unwrap();
//! assert_eq!(sim.machine().acc(), 0x0F);
//!
//! // Running until the program ends:
//! sim.run().unwrap();
//! assert!(sim.hit_halt());
//! ```
//!
//! ## Flags
//!
//! Here, we define `sim` to have the default flags.
//! We could also configure the simulator by editing the flags. For example,
//! if we wish to initialize RAM with seeded random values, we can edit the flags like so:
//!
//! ```
//! # use i8051_ensemble::sim::{Simulator, SimFlags};
//! # use i8051_ensemble::sim::mem::MachineInitStrategy;
//! let sim = Simulator::new(SimFlags {
//!     machine_init: MachineInitStrategy::Seeded { seed: 2110 },
//!     ..Default::default()
//! });
//! ```
//!
//! All of the available flags can be found in [`SimFlags`].
//!
//! ## Step pipeline
//!
//! Each step executes exactly one line:
//! 1. If the source was edited since it was loaded, the step is refused ([`SimErr::StaleProgram`]).
//! 2. If the PC is past the last line, the program has halted.
//! 3. Lines without an instruction (blank lines, bare labels, directives) only advance the PC.
//! 4. Otherwise, the instruction executes, the parity flag is updated, the cycle counter advances,
//!    the timers and serial port advance by the instruction's cycles, and the interrupt controller
//!    may vector to an interrupt.
//!
//! A step either commits all of its effects or none of them.
//! If it fails, only the simulator's [`Status`] changes.
//!
//! ## Querying State
//!
//! The machine state can be read with [`Simulator::machine`].
//! Execution history is available through [`Simulator::trace`] and [`Simulator::serial_log`].

pub mod mem;
pub mod debug;
pub mod device;
pub mod exec;
pub mod cycles;
pub mod interrupt;
pub mod runner;

use std::borrow::Cow;
use std::collections::HashSet;

use crate::asm::{assemble, AsmErr, Program};
use crate::sfr::{self, scon};
use debug::Breakpoint;

use self::mem::Machine;

/// Errors that can occur during simulation.
#[derive(Debug, PartialEq, Eq, Hash, Clone, thiserror::Error)]
pub enum SimErr {
    /// A jump, call, or branch target is not a code label.
    #[error("unresolved label {0}")]
    UnresolvedLabel(String),
    /// The source was edited after the program was loaded.
    #[error("source was modified since the program was loaded")]
    StaleProgram,
    /// An address outside the special function register space was used as an SFR.
    #[error("{0:02X}H is not a special function register")]
    NotAnSfr(u8),
}
impl crate::err::Error for SimErr {
    fn help(&self) -> Option<Cow<str>> {
        match self {
            SimErr::UnresolvedLabel(_) => Some("define the label, or check its spelling (labels are case-sensitive)".into()),
            SimErr::StaleProgram => Some("reload the program to apply source changes".into()),
            SimErr::NotAnSfr(_) => Some("special function registers are at 80H-FFH".into()),
        }
    }
}

/// Anything that can cause a step to abruptly fail to finish.
enum StepBreak {
    /// The PC ran past the end of the program.
    Halt,
    /// A simulation error occurred.
    Err(SimErr),
}
impl From<SimErr> for StepBreak {
    fn from(value: SimErr) -> Self {
        Self::Err(value)
    }
}

/// Reason for why execution paused if it wasn't due to an error.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
enum PauseCondition {
    /// Program reached its end.
    Halt,
    /// Program hit a breakpoint.
    Breakpoint,
    /// Program hit a tripwire condition.
    Tripwire,
    /// Program hit an error and did not pause successfully.
    #[default]
    Unsuccessful
}

/// Configuration flags for [`Simulator`].
///
/// These can be modified after the `Simulator` is created with [`Simulator::new`]
/// and their effects should still apply.
///
/// Read the field descriptions for more details.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct SimFlags {
    /// The creation strategy for RAM (`0x00..=0x7F`).
    ///
    /// This only goes into effect on the next load or reset.
    ///
    /// By default, this flag is [`mem::MachineInitStrategy::default`].
    pub machine_init: mem::MachineInitStrategy,

    /// Whether interrupt vectors jump to `ORG` lines.
    ///
    /// The PC is a line index, so an interrupt vector (e.g., `000BH`) is a line index too.
    /// If this flag is set and the program has an `ORG` directive at the vector's address,
    /// the interrupt jumps to that `ORG` line instead.
    ///
    /// By default, this flag is `false`.
    pub vectors_follow_org: bool,
}

/// The execution status of a [`Simulator`].
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum Status {
    /// Not running, and able to step.
    #[default]
    Idle,
    /// Running continuously (see [`runner::RunLoop`]).
    Running,
    /// The PC reached the end of the program.
    Halted,
    /// The last step failed.
    Faulted(SimErr),
}

/// One executed instruction.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TraceEntry {
    /// The line the instruction was on.
    pub pc: usize,
    /// The 0-based source line number.
    pub line_no: usize,
    /// The mnemonic and operands, rendered from their parsed form.
    pub text: String,
    /// The accumulator after the step.
    pub acc: u8,
    /// The selected bank's registers after the step.
    pub regs: [u8; 8],
}
impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>5}  {:<28} A={:02X}  R0-R7=", self.line_no + 1, self.text, self.acc)?;
        for (i, r) in self.regs.iter().enumerate() {
            match i {
                0 => write!(f, "{r:02X}")?,
                _ => write!(f, " {r:02X}")?,
            }
        }
        Ok(())
    }
}

/// Direction of a [`SerialEvent`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SerialDirection {
    /// Sent by the program (through `SBUF`).
    Transmit,
    /// Received from outside (see [`Simulator::receive_serial`]).
    Receive,
}

/// A byte that went through the serial port.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct SerialEvent {
    #[allow(missing_docs)]
    pub direction: SerialDirection,
    #[allow(missing_docs)]
    pub byte: u8,
}

/// Executes assembled code.
#[derive(Debug)]
pub struct Simulator {
    // ------------------ SIMULATION STATE ------------------
    // Loading or resetting resets these values.

    /// The loaded program.
    program: Program,

    /// The machine state.
    machine: Machine,

    /// Executed instructions, oldest first.
    trace: Vec<TraceEntry>,

    /// Serial port activity, oldest first.
    serial_log: Vec<SerialEvent>,

    /// The execution status.
    status: Status,

    /// Indicates the reason why the last execution (via [`Simulator::run_while`] and adjacent)
    /// had paused.
    pause_condition: PauseCondition,

    /// The number of steps successfully run since the program was loaded.
    ///
    /// This can be set to 0 to reset the counter.
    pub steps_run: u64,

    // ------------------ SOURCE STATE ------------------

    /// The source the program was (or will be) loaded from.
    source: Option<String>,

    /// Whether the source was edited after the program was loaded.
    stale: bool,

    // ------------------ CONFIG/DEBUG STATE ------------------
    // Loading or resetting does not reset these values.

    /// Configuration settings for the simulator.
    ///
    /// See [`SimFlags`] for more details on what configuration
    /// settings are available.
    pub flags: SimFlags,

    /// Breakpoints for the simulator.
    pub breakpoints: HashSet<Breakpoint>,
}
impl Simulator where Simulator: Send + Sync {}

impl Simulator {
    /// Creates a new simulator with the provided flags and an empty program.
    pub fn new(flags: SimFlags) -> Self {
        Self {
            program: Program::default(),
            machine: Machine::new(flags.machine_init, 0),
            trace: vec![],
            serial_log: vec![],
            status: Status::Idle,
            pause_condition: Default::default(),
            steps_run: 0,
            source: None,
            stale: false,
            flags,
            breakpoints: Default::default(),
        }
    }

    /// Assembles source and loads it.
    ///
    /// If the source fails to assemble, the simulator is left as it was.
    pub fn load_source(&mut self, src: &str) -> Result<(), AsmErr> {
        let program = assemble(src)?;
        self.load(program);
        self.source = Some(src.to_string());
        Ok(())
    }

    /// Loads an assembled program.
    ///
    /// This rebuilds the machine state and clears the trace and serial log.
    pub fn load(&mut self, program: Program) {
        log::info!(
            "loaded program ({} lines, {} symbols, entry at line {})",
            program.len(), program.symbols().len(), program.entry() + 1
        );
        self.program = program;
        self.source = None;
        self.stale = false;
        self.reset();
    }

    /// Resets the machine to its state right after the program was loaded.
    ///
    /// This preserves flags, breakpoints, and the stale flag.
    /// This does not reassemble the source (see [`Simulator::reload`]).
    pub fn reset(&mut self) {
        self.machine = Machine::new(self.flags.machine_init, self.program.entry());
        self.trace.clear();
        self.serial_log.clear();
        self.status = Status::Idle;
        self.pause_condition = Default::default();
        self.steps_run = 0;
    }

    /// Replaces the source without reloading.
    ///
    /// The loaded program is kept, but the simulator refuses to step until [`Simulator::reload`].
    pub fn edit_source(&mut self, src: impl Into<String>) {
        self.source = Some(src.into());
        self.stale = true;
        log::debug!("source edited, program is stale");
    }

    /// Reassembles and reloads the current source.
    ///
    /// On error, the previous program stays loaded (and stays stale).
    pub fn reload(&mut self) -> Result<(), AsmErr> {
        match self.source.take() {
            Some(src) => {
                let result = self.load_source(&src);
                if result.is_err() {
                    self.source = Some(src);
                }
                result
            },
            None => {
                self.stale = false;
                self.reset();
                Ok(())
            }
        }
    }

    /// Whether the source was edited after the program was loaded.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// The source of the loaded program (or the edited source, if stale).
    ///
    /// This is `None` if the program was loaded with [`Simulator::load`].
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The loaded program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The current machine state.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// The execution trace, newest first.
    pub fn trace(&self) -> std::iter::Rev<std::slice::Iter<'_, TraceEntry>> {
        self.trace.iter().rev()
    }

    /// Serial port activity, oldest first.
    pub fn serial_log(&self) -> &[SerialEvent] {
        &self.serial_log
    }

    /// All transmitted bytes, as text.
    pub fn serial_output(&self) -> String {
        self.serial_log.iter()
            .filter(|e| e.direction == SerialDirection::Transmit)
            .map(|e| char::from(e.byte))
            .collect()
    }

    /// The execution status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Indicates whether the last execution of the simulator hit a breakpoint.
    pub fn hit_breakpoint(&self) -> bool {
        matches!(self.pause_condition, PauseCondition::Breakpoint)
    }

    /// Indicates whether the simulator has run past the end of the program.
    pub fn hit_halt(&self) -> bool {
        matches!(self.status, Status::Halted)
    }

    /// Whether any breakpoint's condition currently holds.
    pub fn at_breakpoint(&self) -> bool {
        self.breakpoints.iter().any(|bp| bp.check(self))
    }

    /// Toggles one bit of a special function register (e.g., to drive a port pin).
    ///
    /// Only the low 3 bits of `bit` are used.
    pub fn toggle_sfr_bit(&mut self, addr: u8, bit: u8) -> Result<(), SimErr> {
        if addr < 0x80 {
            return Err(SimErr::NotAnSfr(addr));
        }

        self.machine.mem[addr] ^= 1 << (bit & 0b111);
        if addr == sfr::ACC {
            self.machine.update_parity();
        }
        Ok(())
    }

    /// Receives a byte on the serial port.
    ///
    /// The byte is placed in `SBUF` and `SCON.RI` is set.
    pub fn receive_serial(&mut self, byte: u8) {
        self.machine.mem[sfr::SBUF] = byte;
        self.machine.mem[sfr::SCON] |= scon::RI;
        self.serial_log.push(SerialEvent { direction: SerialDirection::Receive, byte });
        log::debug!("serial received {byte:#04X}");
    }

    /// The line an interrupt vector jumps to.
    fn vector_line(program: &Program, flags: SimFlags, vector: u16) -> usize {
        let org = match flags.vectors_follow_org {
            true  => program.origin_line(vector),
            false => None,
        };
        org.unwrap_or(usize::from(vector))
    }

    /// Executes one line.
    ///
    /// This function is a library function and should be used when one step is needed.
    /// The difference between this function and [`Simulator::step_in`] is that this
    /// function can return [`StepBreak::Halt`] as an error and does not update the status.
    fn step(&mut self) -> Result<(), StepBreak> {
        if self.stale {
            return Err(SimErr::StaleProgram.into());
        }

        let pc = self.machine.pc;
        if pc >= self.program.len() {
            return Err(StepBreak::Halt);
        }

        let Some((line, mnemonic)) = self.program.line(pc)
            .filter(|l| l.is_executable())
            .and_then(|l| Some((l, l.mnemonic.as_ref()?)))
        else {
            self.machine.pc += 1;
            self.steps_run += 1;
            return Ok(());
        };

        // Work on a copy, so a failed step leaves the machine untouched.
        let mut next = self.machine.clone();
        let acc_before = next.acc();

        let outcome = exec::execute(&mut next, line, self.program.symbols())?;
        if !outcome.parity_updated && next.acc() != acc_before {
            next.update_parity();
        }

        let cost = cycles::cost(mnemonic, &line.operands);
        next.cycles += u64::from(cost);
        let sent = device::tick(&mut next, cost, outcome.wrote_sbuf);

        let (program, flags) = (&self.program, self.flags);
        interrupt::service(&mut next, |v| Self::vector_line(program, flags, v));

        self.machine = next;
        self.trace.push(TraceEntry {
            pc,
            line_no: line.line_no,
            text: line.instruction().to_string(),
            acc: self.machine.acc(),
            regs: self.machine.banked_regs(),
        });
        if let Some(byte) = sent {
            self.serial_log.push(SerialEvent { direction: SerialDirection::Transmit, byte });
            log::debug!("serial transmitted {byte:#04X}");
        }
        self.steps_run += 1;

        log::trace!("line {}: {line} (A={:02X}, {} cycles)", line.line_no + 1, self.machine.acc(), self.machine.cycles);
        Ok(())
    }

    /// Updates the status after a step, and converts its result to a public one.
    fn settle(&mut self, result: Result<(), StepBreak>) -> Result<(), SimErr> {
        match result {
            Ok(()) => {
                if self.status != Status::Running {
                    self.status = Status::Idle;
                }
                Ok(())
            },
            Err(StepBreak::Halt) => {
                self.status = Status::Halted;
                Ok(())
            },
            Err(StepBreak::Err(SimErr::StaleProgram)) => Err(SimErr::StaleProgram),
            Err(StepBreak::Err(e)) => {
                log::warn!("step at line {} failed: {e}", self.machine.pc + 1);
                self.status = Status::Faulted(e.clone());
                Err(e)
            }
        }
    }

    /// Simulate one step, executing one line.
    ///
    /// Running past the end of the program is not an error; it sets the status to [`Status::Halted`].
    pub fn step_in(&mut self) -> Result<(), SimErr> {
        let result = self.step();
        self.settle(result)
    }

    /// Runs until the tripwire condition returns false (or any of the typical breaks occur).
    ///
    /// The typical break conditions are:
    /// - the PC runs past the end of the program
    /// - a step fails
    /// - a breakpoint matches
    pub fn run_while(&mut self, mut tripwire: impl FnMut(&mut Simulator) -> bool) -> Result<(), SimErr> {
        std::mem::take(&mut self.pause_condition);

        // event loop
        // run until:
        // 1. the tripwire condition returns false
        // 2. the program halts or errors
        // 3. any of the breakpoints are hit
        let result = loop {
            // Tripwire turned off:
            if !tripwire(self) {
                break Ok(PauseCondition::Tripwire);
            }

            // Run a step:
            match self.step() {
                Ok(_) => {},
                Err(e) => break Err(e),
            }

            // After executing, check that any breakpoints were hit.
            if self.at_breakpoint() {
                break Ok(PauseCondition::Breakpoint);
            }
        };

        match result {
            Ok(cond) => {
                self.pause_condition = cond;
                self.settle(Ok(()))
            },
            Err(StepBreak::Halt) => {
                self.pause_condition = PauseCondition::Halt;
                self.settle(Err(StepBreak::Halt))
            },
            Err(e) => self.settle(Err(e)),
        }
    }

    /// Execute the program.
    ///
    /// This blocks until the program ends.
    /// If you would like to limit the maximum number of steps to execute, consider [`Simulator::run_with_limit`].
    pub fn run(&mut self) -> Result<(), SimErr> {
        self.run_while(|_| true)
    }

    /// Execute the program with a limit on how many steps to execute.
    ///
    /// This blocks until the program ends or until the number of steps to execute has been hit.
    pub fn run_with_limit(&mut self, max_steps: u64) -> Result<(), SimErr> {
        let i = self.steps_run;
        self.run_while(|sim| sim.steps_run.wrapping_sub(i) < max_steps)
    }

    /// Marks the simulator as running (or not) under a run loop.
    pub(crate) fn set_running(&mut self, running: bool) {
        match running {
            true => self.status = Status::Running,
            false if self.status == Status::Running => self.status = Status::Idle,
            false => {}
        }
    }
}
impl Default for Simulator {
    fn default() -> Self {
        Self::new(Default::default())
    }
}
