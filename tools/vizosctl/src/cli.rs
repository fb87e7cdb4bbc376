use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output to stderr. Specify multiple times to increase
    /// verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(
        short,
        long,
        value_enum,
        default_value = "json",
        global = true,
        help = "Output format"
    )]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Text,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    #[arg(short, long, help = "Request JSON file (default: stdin)")]
    pub input: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Cpu,
    Disk,
    Bankers,
    Detect,
    Alloc,
    Paging,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Run a CPU scheduling policy over a process list")]
    Cpu {
        #[clap(flatten)]
        args: InputArgs,
    },
    #[command(about = "Run a disk scheduling policy over a request queue")]
    Disk {
        #[clap(flatten)]
        args: InputArgs,
    },
    #[command(about = "Search for a safe sequence with the Banker's algorithm")]
    Bankers {
        #[clap(flatten)]
        args: InputArgs,
    },
    #[command(about = "Detect deadlocked processes from current requests")]
    Detect {
        #[clap(flatten)]
        args: InputArgs,
    },
    #[command(about = "Place processes into memory blocks with a fit strategy")]
    Alloc {
        #[clap(flatten)]
        args: InputArgs,
    },
    #[command(about = "Run a page replacement policy over a reference string")]
    Paging {
        #[clap(flatten)]
        args: InputArgs,
    },
    #[command(about = "Print a random request for one of the subcommands")]
    Generate {
        #[arg(value_enum)]
        kind: Kind,
        #[arg(short, long, env = "VIZOS_SEED", default_value_t = vizos_sim::workloads::DEFAULT_SEED)]
        seed: u64,
        #[arg(
            short = 'n',
            long,
            default_value_t = 5,
            value_parser = clap::value_parser!(u16).range(1..),
            help = "Number of processes, requests or references"
        )]
        count: u16,
    },
}
