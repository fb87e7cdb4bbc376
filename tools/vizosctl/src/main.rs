mod cli;
mod request;

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Format, InputArgs, Kind};
use log::{debug, info};
use request::{AllocRequest, CpuRequest, DiskJob, PagingRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use vizos_sim::deadlock::{BankersInstance, DetectionInstance};
use vizos_sim::{cpu, deadlock, disk, memory, workloads, ValidationError};

/// Exit status for a request the engine rejected.
const EXIT_INVALID: i32 = 2;

fn read_request<T: DeserializeOwned>(args: &InputArgs) -> Result<T> {
    match args.input.as_deref() {
        Some(path) => parse_file(path),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            serde_json::from_str(&buf).context("Failed to parse request from stdin")
        }
    }
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn emit<T: Serialize + Display>(out: &T, format: Format) -> Result<()> {
    let stdout = io::stdout();
    let mut w = stdout.lock();
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut w, out).context("Failed to serialize result")?;
            writeln!(w)?;
        }
        Format::Text => write!(w, "{out}")?,
    }
    Ok(())
}

fn emit_json<T: Serialize>(out: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut w = stdout.lock();
    serde_json::to_writer_pretty(&mut w, out).context("Failed to serialize request")?;
    writeln!(w)?;
    Ok(())
}

fn cmd_generate(kind: Kind, seed: u64, count: usize) -> Result<()> {
    info!("Generating {kind:?} request with seed {seed}");
    let mut rng = workloads::seeded(seed);
    match kind {
        Kind::Cpu => emit_json(&request::random_cpu(&mut rng, count)),
        Kind::Disk => emit_json(&request::random_disk(&mut rng, count)),
        Kind::Bankers => emit_json(&workloads::bankers_instance(&mut rng, count, 3)),
        Kind::Detect => emit_json(&workloads::detection_instance(&mut rng, count, 3)),
        Kind::Alloc => emit_json(&request::random_alloc(&mut rng, count)),
        Kind::Paging => emit_json(&request::random_paging(&mut rng, count)),
    }
}

fn run(cli: Cli) -> Result<()> {
    let format = cli.format;
    match cli.command {
        Commands::Cpu { args } => {
            let req: CpuRequest = read_request(&args)?;
            debug!("{} processes under {}", req.processes.len(), req.policy);
            emit(&cpu::simulate(&req.processes, req.policy)?, format)
        }
        Commands::Disk { args } => {
            let job: DiskJob = read_request(&args)?;
            emit(&disk::schedule(&job.request, job.policy)?, format)
        }
        Commands::Bankers { args } => {
            let inst: BankersInstance = read_request(&args)?;
            let out = deadlock::bankers(&inst)?;
            if log::log_enabled!(log::Level::Debug) {
                out.trace.dump();
            }
            emit(&out, format)
        }
        Commands::Detect { args } => {
            let inst: DetectionInstance = read_request(&args)?;
            let out = deadlock::detect(&inst)?;
            if log::log_enabled!(log::Level::Debug) {
                out.trace.dump();
            }
            emit(&out, format)
        }
        Commands::Alloc { args } => {
            let req: AllocRequest = read_request(&args)?;
            emit(
                &memory::allocate(&req.blocks, &req.processes, req.strategy)?,
                format,
            )
        }
        Commands::Paging { args } => {
            let req: PagingRequest = read_request(&args)?;
            emit(
                &memory::replace_pages(req.policy, req.frames, &req.references)?,
                format,
            )
        }
        Commands::Generate { kind, seed, count } => cmd_generate(kind, seed, count.into()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let llv = match cli.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    if let Err(e) = run(cli) {
        if let Some(invalid) = e.downcast_ref::<ValidationError>() {
            eprintln!("invalid request: {invalid}");
            exit(EXIT_INVALID);
        }
        eprintln!("Error: {e:#}");
        exit(1);
    }
    Ok(())
}
