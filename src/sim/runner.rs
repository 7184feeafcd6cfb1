//! Continuous, paced execution.
//!
//! A [`RunLoop`] steps a shared [`Simulator`] on a worker thread, one step per tick.
//! The simulator sits behind a mutex, so manual steps ([`RunLoop::step_once`]) and
//! inspection from other threads are serialized with the worker's steps.
//! Every step happens entirely under the lock, so no one observes a half-executed step.
//!
//! ```
//! use std::time::Duration;
//! use i8051_ensemble::sim::Simulator;
//! use i8051_ensemble::sim::runner::RunLoop;
//!
//! let mut sim = Simulator::new(Default::default());
//! sim.load_source("LOOP: INC A\nSJMP LOOP").unwrap();
//!
//! let mut run_loop = RunLoop::with_interval(sim, Duration::from_millis(1));
//! assert!(run_loop.start());
//! std::thread::sleep(Duration::from_millis(20));
//! run_loop.stop();
//!
//! assert!(!run_loop.is_running());
//! assert!(run_loop.lock().steps_run > 0);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel as cbc;

use super::{SimErr, Simulator};

/// The default time between steps.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Runs a [`Simulator`] continuously on a worker thread.
///
/// The worker stops on its own when the program halts, a step fails, or a breakpoint matches.
/// Dropping the `RunLoop` stops the worker.
pub struct RunLoop {
    sim: Arc<Mutex<Simulator>>,
    interval: Duration,
    worker: Option<Worker>,
}

struct Worker {
    /// Dropping this disconnects the worker's stop channel.
    stop: cbc::Sender<()>,
    handle: JoinHandle<()>,
}

impl RunLoop {
    /// Creates a run loop stepping at [`DEFAULT_INTERVAL`]. It starts stopped.
    pub fn new(sim: Simulator) -> Self {
        Self::with_interval(sim, DEFAULT_INTERVAL)
    }

    /// Creates a run loop stepping once per `interval`. It starts stopped.
    pub fn with_interval(sim: Simulator, interval: Duration) -> Self {
        Self {
            sim: Arc::new(Mutex::new(sim)),
            interval,
            worker: None,
        }
    }

    /// A handle to the shared simulator.
    pub fn simulator(&self) -> Arc<Mutex<Simulator>> {
        Arc::clone(&self.sim)
    }

    /// Locks the simulator.
    ///
    /// The worker cannot step while the guard is held.
    pub fn lock(&self) -> MutexGuard<'_, Simulator> {
        lock(&self.sim)
    }

    /// Whether the worker is running.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.handle.is_finished())
    }

    /// Starts the worker.
    ///
    /// This returns false (and does nothing) if it is already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() { return false; }
        // A worker that stopped itself still needs to be joined.
        self.join_worker();

        let (stop_tx, stop_rx) = cbc::bounded::<()>(0);
        let sim = Arc::clone(&self.sim);
        let ticker = cbc::tick(self.interval);

        lock(&sim).set_running(true);
        log::debug!("run loop started ({:?} per step)", self.interval);

        let handle = std::thread::spawn(move || loop {
            cbc::select! {
                recv(stop_rx) -> _ => break,
                recv(ticker) -> _ => {
                    let mut guard = lock(&sim);
                    if !advance(&mut guard) {
                        guard.set_running(false);
                        break;
                    }
                },
            }
        });

        self.worker = Some(Worker { stop: stop_tx, handle });
        true
    }

    /// Stops the worker, waiting for it to finish its current step.
    ///
    /// This does nothing if it is not running.
    pub fn stop(&mut self) {
        if self.join_worker() {
            lock(&self.sim).set_running(false);
            log::debug!("run loop stopped");
        }
    }

    /// Executes one step on the calling thread.
    ///
    /// This can be called whether or not the worker is running.
    pub fn step_once(&self) -> Result<(), SimErr> {
        lock(&self.sim).step_in()
    }

    /// Disconnects and joins the worker, returning whether there was one.
    fn join_worker(&mut self) -> bool {
        let Some(Worker { stop, handle }) = self.worker.take() else { return false };

        std::mem::drop(stop);
        // The worker only panics if a step panicked, which the mutex already records.
        let _ = handle.join();
        true
    }
}
impl Drop for RunLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
impl std::fmt::Debug for RunLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLoop")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Steps once, returning whether the worker should keep going.
fn advance(sim: &mut Simulator) -> bool {
    match sim.step_in() {
        Ok(()) if sim.hit_halt() => {
            log::info!("program halted after {} steps", sim.steps_run);
            false
        },
        Ok(()) if sim.at_breakpoint() => {
            log::info!("breakpoint hit at line {}", sim.machine().pc + 1);
            false
        },
        Ok(()) => true,
        Err(e) => {
            log::warn!("run stopped: {e}");
            false
        }
    }
}

fn lock(sim: &Mutex<Simulator>) -> MutexGuard<'_, Simulator> {
    // A step never leaves the simulator half-updated, so a poisoned lock is still usable.
    sim.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::sim::debug::{Breakpoint, Comparator};
    use crate::sim::{SimErr, Simulator, Status};

    use super::RunLoop;

    fn run_loop(src: &str) -> RunLoop {
        let mut sim = Simulator::new(Default::default());
        sim.load_source(src).unwrap();
        RunLoop::with_interval(sim, Duration::from_millis(1))
    }

    fn wait_until_stopped(rl: &RunLoop) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while rl.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(!rl.is_running(), "run loop did not stop");
    }

    #[test]
    fn test_start_stop_idempotent() {
        let mut rl = run_loop("LOOP: INC A\nSJMP LOOP");
        assert!(!rl.is_running());
        assert!(rl.start());
        assert!(!rl.start());
        assert_eq!(rl.lock().status(), &Status::Running);

        rl.stop();
        rl.stop();
        assert!(!rl.is_running());
        assert_eq!(rl.lock().status(), &Status::Idle);

        // restartable
        assert!(rl.start());
        rl.stop();
    }

    #[test]
    fn test_stops_on_halt() {
        let mut rl = run_loop("MOV A, #1\nMOV A, #2");
        rl.start();
        wait_until_stopped(&rl);

        let sim = rl.lock();
        assert!(sim.hit_halt());
        assert_eq!(sim.machine().acc(), 2);
    }

    #[test]
    fn test_stops_on_error() {
        let mut rl = run_loop("NOP\nSJMP MISSING");
        rl.start();
        wait_until_stopped(&rl);

        let sim = rl.lock();
        assert_eq!(sim.status(), &Status::Faulted(SimErr::UnresolvedLabel("MISSING".to_string())));
    }

    #[test]
    fn test_stops_on_breakpoint() {
        let mut rl = run_loop("LOOP: INC A\nSJMP LOOP");
        rl.lock().breakpoints.insert(Breakpoint::Acc(Comparator::Eq(3)));
        rl.start();
        wait_until_stopped(&rl);

        let sim = rl.lock();
        assert_eq!(sim.machine().acc(), 3);
        assert_eq!(sim.status(), &Status::Idle);
    }

    #[test]
    fn test_manual_step_while_running() {
        let mut rl = RunLoop::with_interval(Simulator::new(Default::default()), Duration::from_secs(60));
        rl.lock().load_source("INC A\nINC A\nINC A").unwrap();
        rl.start();

        // the first tick is a minute away, so only manual steps run
        rl.step_once().unwrap();
        rl.step_once().unwrap();
        assert_eq!(rl.lock().machine().acc(), 2);
        assert!(rl.is_running());
        rl.stop();
    }

    #[test]
    fn test_stale_stops_worker() {
        let mut rl = run_loop("LOOP: SJMP LOOP");
        rl.lock().edit_source("NOP");
        rl.start();
        wait_until_stopped(&rl);
        assert_eq!(rl.step_once(), Err(SimErr::StaleProgram));
    }
}
