use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use synacor_vm::hypervisor_controller::{
    disassemble_count, disassemble_range, dump_state, format_registers, format_status,
};
use synacor_vm::{Machine, Status, VmConfig};

#[derive(Parser, Debug)]
#[command(name = "synacor_vm", about = "Run a synacor VM program image")]
struct Args {
    /// Program image (little-endian 16-bit words)
    image: PathBuf,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay between instructions, in microseconds
    #[arg(long)]
    pacing_micros: Option<u64>,

    /// Stop after this many executed instructions
    #[arg(long)]
    max_steps: Option<u64>,

    /// Print a disassembly of START..=END (hex) and exit
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    disassemble: Option<Vec<String>>,

    /// Print the final machine state as JSON
    #[arg(long)]
    dump_state: bool,

    /// Log a status line every N milliseconds while running
    #[arg(long)]
    monitor_ms: Option<u64>,
}

fn parse_hex(s:&str) -> Result<u16> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).with_context(|| format!("invalid hex address {s:?}"))
}

fn main() -> Result<()> {
    // stdout carries the terminal stream, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => VmConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => VmConfig::default(),
    };
    if let Some(pacing) = args.pacing_micros {
        config.pacing_micros = pacing;
    }
    if args.max_steps.is_some() {
        config.max_steps = args.max_steps;
    }

    let f = File::open(&args.image)
        .with_context(|| format!("opening program image {}", args.image.display()))?;
    let mut m0 = Machine::from_image(BufReader::new(f), config)
        .with_context(|| format!("loading program image {}", args.image.display()))?;
    info!(image = %args.image.display(), "program loaded");

    if let Some(range) = &args.disassemble {
        let (start, end) = (parse_hex(&range[0])?, parse_hex(&range[1])?);
        if start > end {
            bail!("disassembly range is empty: {start:#06X} > {end:#06X}");
        }
        for line in disassemble_range(&m0.mem, start, end) {
            println!("{line}");
        }
        return Ok(());
    }

    m0.set_terminal(io::stdout());
    m0.set_input(io::stdin());
    let monitor = m0.monitor();

    if let Some(ms) = args.monitor_ms {
        let monitor = monitor.clone();
        thread::spawn(move || loop {
            thread::sleep(Duration::from_millis(ms));
            let snapshot = monitor.snapshot();
            info!("{}", format_status(&snapshot));
            if snapshot.status == Status::Finished {
                break;
            }
        });
    }

    let engine = thread::spawn(move || {
        let result = m0.run();
        (m0, result)
    });
    let (m0, result) = engine
        .join()
        .map_err(|_| anyhow::anyhow!("engine thread panicked"))?;
    result.context("running program")?;

    let snapshot = m0.snapshot();
    if let Some(e) = m0.last_error() {
        info!(errors = m0.error_count(), "last recorded fault: {e}");
    }
    if args.dump_state {
        println!("{}", dump_state(&snapshot)?);
        println!("{}", format_registers(&snapshot));
        for line in disassemble_count(&m0.mem, snapshot.address, 5) {
            println!("{line}");
        }
    }

    Ok(())
}
