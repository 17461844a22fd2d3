//! Entry point: parse the CLI, build the Kernel, drive the tick loop.

mod cli;
mod error;
mod kernel;
mod mmu;
mod page_table;
mod process;
mod renderer;
mod replacer;
mod rng;
mod syscall;

use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use cli::Cli;
use kernel::Kernel;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut kernel = Kernel::new(cli.policy.as_str(), cli.seed).with_context(|| {
        format!("failed to start simulation with policy '{}'", cli.policy.as_str())
    })?;

    let mut tick: u64 = 0;
    loop {
        if let Some(max_ticks) = cli.max_ticks {
            if tick >= max_ticks {
                break;
            }
        }
        if kernel.is_finished() {
            break;
        }

        kernel.tick().context("simulation tick failed")?;
        tick += 1;

        renderer::render(
            tick,
            kernel.memory_stats(),
            kernel.access_stats(),
            &kernel.process_stats(),
        );
        thread::sleep(Duration::from_millis(cli.tick_ms));
    }

    Ok(())
}
