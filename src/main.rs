use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use i8051_ensemble::sim::mem::MachineInitStrategy;
use i8051_ensemble::sim::{SimFlags, Simulator, Status};

/// Assembles and runs an 8051 assembly program, then prints the serial output and registers.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// `.asm` file to run
    path: PathBuf,
    /// Maximum number of steps to run
    #[arg(short, long, default_value_t = 10_000)]
    steps: u64,
    /// Print every executed instruction (oldest first)
    #[arg(short, long)]
    trace: bool,
    /// Fill RAM with seeded random bytes instead of zeroes
    #[arg(long)]
    seed: Option<u64>,
    /// Jump interrupt vectors to the `ORG` line with the vector's address
    #[arg(long)]
    org_vectors: bool,
    /// Character to receive on the serial port before running
    #[arg(long)]
    rx: Option<char>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let src = std::fs::read_to_string(&args.path)
        .with_context(|| format!("could not read {}", args.path.display()))?;

    let machine_init = match args.seed {
        Some(seed) => MachineInitStrategy::Seeded { seed },
        None => MachineInitStrategy::default(),
    };
    let mut sim = Simulator::new(SimFlags { machine_init, vectors_follow_org: args.org_vectors });
    sim.load_source(&src).map_err(with_help)?;

    if let Some(c) = args.rx {
        let Ok(byte) = u8::try_from(c) else {
            bail!("cannot receive {c:?} on the serial port (not a single byte)");
        };
        sim.receive_serial(byte);
    }

    let result = sim.run_with_limit(args.steps);

    if args.trace {
        for entry in sim.trace().rev() {
            println!("{entry}");
        }
    }
    print_summary(&sim);

    result.map_err(with_help)
}

fn print_summary(sim: &Simulator) {
    let m = sim.machine();

    println!("serial: {}", sim.serial_output().escape_debug());
    println!(
        "A={:02X} B={:02X} PSW={:02X} SP={:02X} DPTR={:04X}",
        m.acc(), m.b(), m.psw().get(), m.sp(), m.dptr()
    );
    let regs: Vec<_> = m.banked_regs().iter().map(|r| format!("{r:02X}")).collect();
    println!("R0-R7={} (bank {})", regs.join(" "), m.psw().bank());

    let status = match sim.status() {
        Status::Halted => "halted",
        Status::Faulted(_) => "faulted",
        Status::Idle | Status::Running => "step limit reached",
    };
    println!("{status} at line {} after {} steps ({} cycles)", m.pc + 1, sim.steps_run, m.cycles);
}

/// Converts a crate error to an `anyhow` error, keeping its help message.
fn with_help<E: i8051_ensemble::err::Error + Send + Sync + 'static>(e: E) -> anyhow::Error {
    match e.help() {
        Some(help) => anyhow::anyhow!("{e}\nhelp: {help}"),
        None => anyhow::Error::new(e),
    }
}
