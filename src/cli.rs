//! Command-line surface, grounded on `xtask/src/main.rs`'s
//! `#[derive(Parser)]` CLI shape.

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "vmsim")]
#[command(about = "Discrete-event simulator of a demand-paged virtual-memory subsystem")]
pub struct Cli {
    /// Page-replacement policy to drive the simulation.
    #[arg(value_enum, default_value = "clock")]
    pub policy: Policy,

    /// Seed the RNG for a reproducible run. Omit to draw from entropy.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many ticks instead of running until every process
    /// has exited.
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Milliseconds to sleep between ticks.
    #[arg(long, default_value_t = 500)]
    pub tick_ms: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    Clock,
    Random,
}

impl Policy {
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Clock => "clock",
            Policy::Random => "random",
        }
    }
}
