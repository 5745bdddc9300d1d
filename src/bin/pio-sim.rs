//! Demo driver: load a program and settings from an INI file, run it for a fixed
//! number of cycles, and report the final state machine state.

use clap::Parser;
use pio_sim::{config, machine::StateMachine};

#[derive(Parser)]
#[command(about = "Run a PIO program against the cycle-accurate emulator")]
struct Args {
    /// Path to an INI file with a [settings] and optional [program] section.
    config: std::path::PathBuf,

    /// Number of cycles to run.
    #[arg(short, long, default_value_t = 100)]
    cycles: u64,

    /// Log every tick's PC and registers at debug level.
    #[arg(short, long)]
    trace: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let (settings, program) = match config::load_and_build(&args.config) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("error loading {}: {err}", args.config.display());
            std::process::exit(1);
        }
    };
    let program = program.unwrap_or([0; 32]);

    let mut sm = StateMachine::new(0, settings, program);
    for _ in 0..args.cycles {
        if args.trace {
            log::debug!(
                "pc={} x={} y={} isr={:#010x} osr={:#010x}",
                sm.regs.pc,
                sm.regs.x,
                sm.regs.y,
                sm.regs.isr,
                sm.regs.osr
            );
        }
        sm.tick();
    }

    println!("clock:  {}", sm.clock);
    println!("pc:     {}", sm.regs.pc);
    println!("x:      {:#010x}", sm.regs.x);
    println!("y:      {:#010x}", sm.regs.y);
    println!("isr:    {:#010x}", sm.regs.isr);
    println!("osr:    {:#010x}", sm.regs.osr);
    println!(
        "rx_fifo: {:?} (count {})",
        &sm.fifo.rx[..sm.fifo.rx_count as usize],
        sm.fifo.rx_count
    );
}
