use std::error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use emu::config::Boot;
use emu::cpu::arm7tdmi::Arm7tdmi;
use emu::memory::Memory;

mod config;

use config::RunnerConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BootArg {
    Bios,
    Cartridge,
}

impl From<BootArg> for Boot {
    fn from(value: BootArg) -> Self {
        match value {
            BootArg::Bios => Self::Bios,
            BootArg::Cartridge => Self::Cartridge,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Runs raw ARM7TDMI code on a headless GBA core.", long_about = None)]
struct Args {
    /// Raw image to load.
    #[arg(name = "IMAGE")]
    image: PathBuf,

    /// TOML file with `[cpu]` and `[run]` sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cycle budget of the run.
    #[arg(long)]
    cycles: Option<u64>,

    /// Address the image is copied to, in hex with or without `0x`.
    #[arg(long, value_parser = parse_address)]
    load_address: Option<u32>,

    #[arg(long, value_enum)]
    boot: Option<BootArg>,

    /// Also write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_address(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X").replace('_', "");
    u32::from_str_radix(&digits, 16).map_err(|e| format!("invalid address {s}: {e}"))
}

fn main() -> Result<(), Box<dyn error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Dropping the guard flushes the file writer, keep it until the end of main.
    let _guard = match &args.log_file {
        Some(path) => {
            let file = fs::File::create(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.and(writer))
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    };

    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(cycles) = args.cycles {
        config.run.cycles = cycles;
    }
    if let Some(address) = args.load_address {
        config.run.load_address = address;
    }
    if let Some(boot) = args.boot {
        config.cpu.boot = boot.into();
    }

    let image = fs::read(&args.image)?;
    tracing::info!(
        "loading {} ({} bytes) at 0x{:08X}",
        args.image.display(),
        image.len(),
        config.run.load_address
    );

    let mut memory = Memory::new();
    memory.load(config.run.load_address, &image)?;

    let mut cpu = Arm7tdmi::new(memory, config.cpu);
    cpu.init();

    let result = cpu.run(config.run.cycles);
    tracing::info!("ran until cycle {}", cpu.scheduler.now());
    print_registers(&cpu);

    Ok(result?)
}

fn print_registers(cpu: &Arm7tdmi<Memory>) {
    for row in 0..4 {
        let line: Vec<String> = (0..4)
            .map(|column| {
                let index = row * 4 + column;
                format!("r{index:<2} = 0x{:08X}", cpu.register(index))
            })
            .collect();
        println!("{}", line.join("  "));
    }
    println!(
        "cpsr = 0x{:08X} ({:?}, {})",
        cpu.cpsr().bits(),
        cpu.mode(),
        if cpu.is_thumb() { "thumb" } else { "arm" }
    );
}
