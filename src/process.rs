//! A synthetic workload with page-reference locality.
//!
//! `Process::step` is the Rust shape of spec.md §4.3's `run(kernel)`: it
//! returns the `Syscall` the process wants to issue rather than taking a
//! `&mut Kernel` directly, since the kernel also needs mutable access to
//! the very map this process lives in while dispatching that syscall.
//! [`Kernel::run`](crate::kernel::Kernel::run) is what actually drives the
//! data flow spec.md describes (process emits, kernel dispatches).

use std::fmt;

use rand::Rng;

use crate::page_table::PageTableEntry;
use crate::rng::{bernoulli, pick, rand_int};
use crate::syscall::Syscall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(u32);

impl ProcessId {
    pub fn new(raw: u32) -> Self {
        ProcessId(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct Process {
    id: ProcessId,
    pub(crate) page_table: Vec<PageTableEntry>,
    ttl: u32,
    counter: u32,
    working_set: Vec<usize>,
    idle_set: Vec<usize>,
    working_set_ttl: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessStats {
    pub pid: ProcessId,
    pub ttl: u32,
    pub counter: u32,
    pub page_count: usize,
    pub working_set_len: usize,
    pub working_set_ttl: u32,
    pub working_set_ratio_percent: f64,
}

impl Process {
    pub fn new(id: ProcessId, rng: &mut impl Rng) -> Self {
        let page_count = rand_int(rng, 32, 64) as usize;
        let ttl = rand_int(rng, 1024, 2048);

        let mut process = Process {
            id,
            page_table: vec![PageTableEntry::new(); page_count],
            ttl,
            counter: 0,
            working_set: Vec::new(),
            idle_set: Vec::new(),
            working_set_ttl: 0,
        };
        process.rotate(rng);
        process
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Re-partition page indices into a fresh working/idle set and push the
    /// next rotation threshold further out.
    fn rotate(&mut self, rng: &mut impl Rng) {
        self.working_set_ttl += rand_int(rng, 128, 256);
        self.working_set.clear();
        self.idle_set.clear();
        for page in 0..self.page_table.len() {
            if bernoulli(rng, 0.20) {
                self.working_set.push(page);
            } else {
                self.idle_set.push(page);
            }
        }
    }

    /// Advance one step and return the syscall the process wants to issue.
    /// The caller (the kernel) is responsible for dispatching it.
    pub fn step(&mut self, rng: &mut impl Rng) -> Syscall {
        self.counter += 1;
        if self.counter >= self.ttl {
            return Syscall::Exit { pid: self.id.get() };
        }

        if self.counter >= self.working_set_ttl {
            self.rotate(rng);
        }

        let use_working = bernoulli(rng, 0.9);
        let mut chosen = if use_working { &self.working_set } else { &self.idle_set };
        if chosen.is_empty() {
            chosen = if use_working { &self.idle_set } else { &self.working_set };
        }
        let page = *pick(rng, chosen);
        let modify = bernoulli(rng, 0.5);

        Syscall::AccessMemory { pid: self.id.get(), page, modify }
    }

    pub fn stats(&self) -> ProcessStats {
        let page_count = self.page_table.len();
        let ratio = if page_count == 0 {
            0.0
        } else {
            100.0 * self.working_set.len() as f64 / page_count as f64
        };
        ProcessStats {
            pid: self.id,
            ttl: self.ttl,
            counter: self.counter,
            page_count,
            working_set_len: self.working_set.len(),
            working_set_ttl: self.working_set_ttl,
            working_set_ratio_percent: ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn new_process_partitions_every_page() {
        let mut rng = rng();
        let p = Process::new(ProcessId::new(1000), &mut rng);
        let stats = p.stats();
        assert!((32..=64).contains(&stats.page_count));
        assert!((1024..=2048).contains(&stats.ttl));
        assert_eq!(p.working_set.len() + p.idle_set.len(), stats.page_count);
    }

    #[test]
    fn terminates_after_exactly_ttl_steps() {
        let mut rng = rng();
        let mut p = Process::new(ProcessId::new(1000), &mut rng);
        let ttl = p.stats().ttl;

        let mut steps = 0;
        loop {
            steps += 1;
            match p.step(&mut rng) {
                Syscall::Exit { .. } => break,
                Syscall::AccessMemory { .. } => {}
            }
            assert!(steps <= ttl, "process ran past its ttl without exiting");
        }
        assert_eq!(steps, ttl);
    }

    #[test]
    fn access_memory_pages_are_within_page_table() {
        let mut rng = rng();
        let mut p = Process::new(ProcessId::new(1000), &mut rng);
        let page_count = p.stats().page_count;
        for _ in 0..200 {
            if let Syscall::AccessMemory { page, .. } = p.step(&mut rng) {
                assert!(page < page_count);
            } else {
                break;
            }
        }
    }
}
