// nesemu - headless front end
//
// Loads an iNES ROM, runs it for a number of frames without a window and
// optionally saves the final frame as a PNG.

use clap::Parser;
use nesemu::debug::{LogLevel, Logger};
use nesemu::emulator::{Emulator, EmulatorConfig, CONFIG_FILE};
use std::path::PathBuf;

/// CPU cycles in one NTSC frame, rounded up
const CYCLES_PER_FRAME: u64 = 29781;

/// Headless NES emulator
#[derive(Parser, Debug)]
#[command(name = "nesemu")]
#[command(about = "Run an NES ROM headlessly", long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    rom: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value = "60")]
    frames: u64,

    /// Configuration file (created with defaults if missing)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save the final frame as a PNG
    #[arg(short, long)]
    screenshot: bool,

    /// Log every executed instruction in nestest format
    #[arg(short, long)]
    trace: bool,

    /// Log level (none, error, warning, info, debug, trace)
    #[arg(short, long)]
    log_level: Option<LogLevel>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut config = EmulatorConfig::load_or_default(&config_path);
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.trace {
        config.emulation.trace = true;
        config.logging.level = LogLevel::Trace;
    }

    let mut logger = Logger::new(config.logging.level).with_buffer_size(config.logging.buffer_size);
    if let Some(file) = &config.logging.file {
        logger = logger.with_log_file(file)?;
    }
    let logger = logger.install()?;

    let mut emulator = Emulator::with_config(config);
    emulator.load_file(&args.rom)?;

    println!("Running {} frames...", args.frames);
    while emulator.frame_count() < args.frames {
        emulator.run_cycles(CYCLES_PER_FRAME);
    }

    let cpu = emulator.cpu();
    println!(
        "Completed {} frames. PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        emulator.frame_count(),
        cpu.pc,
        cpu.a,
        cpu.x,
        cpu.y,
        cpu.status,
        cpu.sp,
        cpu.cycles
    );

    if args.screenshot {
        let path = emulator.save_screenshot()?;
        println!("Screenshot saved to: {}", path.display());
    }

    if args.trace {
        for entry in logger.last_entries(5) {
            println!("{}", entry);
        }
    }

    log::logger().flush();
    Ok(())
}
