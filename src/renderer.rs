//! Textual dashboard, grounded on `userspace/programs/src/btop.rs`'s
//! ANSI clear-and-redraw table (`"\x1b[2J\x1b[H"`, bracketed colored
//! header, fixed-width columns). Translated from that program's
//! byte-at-a-time `emit_str`/`emit_num` no_std writer into plain
//! `println!` with Rust's own width specifiers.

use crate::kernel::AccessStats;
use crate::mmu::MemoryStats;
use crate::process::ProcessStats;

const VISIBLE_PROCESSES: usize = 20;

pub fn render(tick: u64, memory: MemoryStats, access: AccessStats, processes: &[ProcessStats]) {
    print!("\x1b[2J\x1b[H");
    println!("\x1b[1;36mvmsim\x1b[0m — tick {tick}");
    println!();

    render_memory_bar(memory);
    println!();
    render_access_stats(access);
    println!();
    render_process_table(processes);
}

fn render_memory_bar(memory: MemoryStats) {
    const WIDTH: usize = 40;
    let filled = if memory.total == 0 {
        0
    } else {
        (WIDTH * memory.busy) / memory.total
    };
    let bar: String = (0..WIDTH)
        .map(|i| if i < filled { '#' } else { '.' })
        .collect();
    println!(
        "  Memory [{bar}] {busy}/{total} frames ({load:.2}%)",
        busy = memory.busy,
        total = memory.total,
        load = memory.load_percent
    );
}

fn render_access_stats(access: AccessStats) {
    println!(
        "  Accesses: {total}  |  Faults: {faults} ({fault_rate})  |  Replaced: {replaced} ({replace_rate})",
        total = access.total,
        faults = access.faults,
        fault_rate = format_percent(access.fault_rate_percent()),
        replaced = access.replaced,
        replace_rate = format_percent(access.replacement_rate_percent()),
    );
}

fn format_percent(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{value:.2}%")
    }
}

fn render_process_table(processes: &[ProcessStats]) {
    println!("\x1b[1m  {:>6}  {:>6}  {:>6}  {:>9}  {:>12}\x1b[0m", "PID", "PAGES", "WS", "COUNTER", "WS RATIO");
    println!("  ------  ------  ------  ---------  ------------");
    for stats in processes.iter().take(VISIBLE_PROCESSES) {
        println!(
            "  {pid:>6}  {pages:>6}  {ws:>6}  {counter:>4}/{ttl:<4}  {ratio:>11.1}%",
            pid = stats.pid,
            pages = stats.page_count,
            ws = stats.working_set_len,
            counter = stats.counter,
            ttl = stats.ttl,
            ratio = stats.working_set_ratio_percent,
        );
    }
    if processes.len() > VISIBLE_PROCESSES {
        println!("  ... and {} more", processes.len() - VISIBLE_PROCESSES);
    }
}
