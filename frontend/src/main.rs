use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use invaders_machines::CpmHarness;
use invaders_machines::registry;
use log::{error, info};

mod config;
mod error;
mod headless;
mod input;
mod rom_path;
mod screenshot;

use config::{Config, FAULT_DUMP_PATH};
use error::FrontendError;
use input::InputScript;

#[derive(Parser, Debug)]
#[command(name = "invaders", version)]
#[command(about = "Intel 8080 arcade board emulator", long_about = None)]
struct Cli {
    /// Settings file (default: <config dir>/invaders/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "invaders_core=trace" (RUST_LOG wins)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the machines that can be run
    List,
    /// Run a machine headless for a number of frames
    Run(RunArgs),
    /// Run a CP/M diagnostic program (cpudiag, TST8080, ...)
    TestRom(TestRomArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Machine name, see `invaders list`
    machine: String,

    /// ZIP file, directory holding <rom>.zip, or directory of loose ROMs
    rom_path: Option<PathBuf>,

    #[arg(long)]
    frames: Option<u64>,

    /// Write a raw memory image here when the run ends
    #[arg(long, value_name = "PATH")]
    dump_core: Option<PathBuf>,

    /// Save the final frame as PNG
    #[arg(long, value_name = "PATH")]
    screenshot: Option<PathBuf>,

    /// Accept ROM images whose CRC32 does not match
    #[arg(long)]
    skip_checksums: bool,

    /// Scripted input, BUTTON@FRAME[+FRAMES]; may be repeated
    #[arg(long, value_name = "PRESS")]
    press: Vec<String>,
}

#[derive(Args, Debug)]
struct TestRomArgs {
    /// CP/M .COM file, loaded at 0x0100
    path: PathBuf,

    #[arg(long)]
    max_steps: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The config can name the log level, so it is read before logging exists.
    let config = Config::load(cli.config.as_deref());
    let level = match (&cli.log_level, &config) {
        (Some(level), _) => level.as_str(),
        (None, Ok(config)) => config.log_level(),
        (None, Err(_)) => config::DEFAULT_LOG_LEVEL,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match config.and_then(|config| dispatch(cli.command, &config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Command, config: &Config) -> Result<(), FrontendError> {
    match command {
        Command::List => {
            for entry in registry::all() {
                println!("{:<12} roms: {}", entry.name, entry.rom_name);
            }
            Ok(())
        }
        Command::Run(args) => run_machine(args, config),
        Command::TestRom(args) => run_test_rom(args, config),
    }
}

fn run_machine(args: RunArgs, config: &Config) -> Result<(), FrontendError> {
    let entry = registry::find(&args.machine).ok_or_else(|| FrontendError::UnknownMachine {
        name: args.machine.clone(),
        available: registry::all()
            .iter()
            .map(|e| e.name)
            .collect::<Vec<_>>()
            .join(", "),
    })?;

    let rom_path = args
        .rom_path
        .or_else(|| config.rom_path.clone())
        .ok_or(FrontendError::MissingRomPath)?;
    let verify_checksums = !(args.skip_checksums || config.skip_checksums);

    let rom_set = rom_path::load_rom_set(entry.rom_name, &rom_path)?;
    let mut machine = (entry.create)(&rom_set, verify_checksums)?;
    let script = InputScript::parse(&args.press, machine.input_map())?;
    machine.reset();

    let frames = args.frames.unwrap_or_else(|| config.frames());
    let dump_path = args.dump_core.or_else(|| config.dump_path.clone());
    let fault_dump = dump_path.clone().unwrap_or_else(|| PathBuf::from(FAULT_DUMP_PATH));

    info!("running {} for {frames} frames", entry.name);
    let summary = headless::run_with_fault_dump(machine.as_mut(), frames, &script, &fault_dump)?;
    info!(
        "{} frames ({:.1} s emulated){}",
        summary.frames,
        summary.frames as f64 / machine.frame_rate_hz(),
        if summary.halted { ", halted" } else { "" }
    );

    if let Some(path) = &args.screenshot {
        screenshot::save_screenshot(machine.as_ref(), path)?;
    }
    if let Some(path) = &dump_path {
        screenshot::dump_core(machine.as_ref(), path)?;
    }
    Ok(())
}

fn run_test_rom(args: TestRomArgs, config: &Config) -> Result<(), FrontendError> {
    let max_steps = args.max_steps.unwrap_or_else(|| config.max_steps());
    let mut harness = CpmHarness::from_file(&args.path)?;
    let report = harness.run(max_steps)?;

    println!("{}", report.output);
    info!(
        "{}: {} instructions, {} cycles",
        args.path.display(),
        report.steps,
        report.cycles
    );
    Ok(())
}
