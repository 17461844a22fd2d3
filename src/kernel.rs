//! Owns the processes and the MMU; drives the simulation loop, services
//! syscalls, and handles page faults.
//!
//! Grounded on the teacher's `task::scheduler::Scheduler` (snapshot the
//! live set at tick start, then iterate) and `syscall::memory::sys_brk`
//! (try the cheap path first, fall back to reclaiming a resource).

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::SimError;
use crate::mmu::{MemoryStats, Mmu};
use crate::process::{Process, ProcessId, ProcessStats};
use crate::replacer::{self, Replacer};
use crate::rng::{bernoulli, rand_int, rand_int_unique};
use crate::syscall::{Exception, Syscall};
use tracing::{debug, warn};

pub const MAX_PROCESS_COUNT: usize = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccessStats {
    pub total: u64,
    pub faults: u64,
    pub replaced: u64,
}

impl AccessStats {
    pub fn fault_rate_percent(&self) -> f64 {
        if self.total == 0 {
            f64::NAN
        } else {
            100.0 * self.faults as f64 / self.total as f64
        }
    }

    pub fn replacement_rate_percent(&self) -> f64 {
        if self.faults == 0 {
            f64::NAN
        } else {
            100.0 * self.replaced as f64 / self.faults as f64
        }
    }
}

pub struct Kernel {
    processes: HashMap<ProcessId, Process>,
    mmu: Mmu,
    replacer: Box<dyn Replacer>,
    rng: StdRng,
    stats: AccessStats,
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("processes", &self.processes)
            .field("mmu", &self.mmu)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Kernel {
    /// Validate `policy` against the registry, build the MMU and spawn the
    /// initial fleet. `seed` is `None` to draw from entropy, `Some` for a
    /// reproducible run.
    pub fn new(policy: &str, seed: Option<u64>) -> Result<Self, SimError> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(policy, rng)
    }

    /// Same as [`Kernel::new`] but with a caller-supplied RNG, for
    /// reproducible tests.
    pub fn with_rng(policy: &str, mut rng: StdRng) -> Result<Self, SimError> {
        let replacer = replacer::build(policy)?;
        let total_frames = rand_int(&mut rng, 512, 1024) as usize;

        let mut kernel = Kernel {
            processes: HashMap::new(),
            mmu: Mmu::new(total_frames),
            replacer,
            rng,
            stats: AccessStats::default(),
        };

        let initial = rand_int(&mut kernel.rng, 5, 10);
        debug!(total_frames, initial, policy, "kernel initialized");
        kernel.spawn(initial);
        Ok(kernel)
    }

    /// Create up to `n` new processes, capped by `MAX_PROCESS_COUNT`.
    /// Excess requests are silently truncated, per spec.
    pub fn spawn(&mut self, n: u32) {
        let capacity = MAX_PROCESS_COUNT.saturating_sub(self.processes.len());
        let to_spawn = (n as usize).min(capacity);
        for _ in 0..to_spawn {
            let pid = rand_int_unique(&mut self.rng, 1000, 9999, |candidate| {
                self.processes.contains_key(&ProcessId::new(candidate))
            });
            let process = Process::new(ProcessId::new(pid), &mut self.rng);
            debug!(pid, live = self.processes.len() + 1, "process spawned");
            self.processes.insert(ProcessId::new(pid), process);
        }
    }

    /// One outer-loop iteration: step every live process (snapshot order
    /// fixed at tick start), then maybe spawn more.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let snapshot: Vec<ProcessId> = self.processes.keys().copied().collect();

        for pid in snapshot {
            let process_time = rand_int(&mut self.rng, 64, 128);
            for _ in 0..process_time {
                self.stats.total += 1;
                let syscall = self
                    .processes
                    .get_mut(&pid)
                    .expect("pid from this tick's snapshot is still live")
                    .step(&mut self.rng);
                let terminated = matches!(syscall, Syscall::Exit { .. });
                self.syscall(syscall)?;
                if terminated {
                    break;
                }
            }
        }

        if self.processes.len() < MAX_PROCESS_COUNT && bernoulli(&mut self.rng, 0.45) {
            let n = rand_int(&mut self.rng, 1, 3);
            self.spawn(n);
        }
        Ok(())
    }

    /// Dispatch a syscall. All effects are synchronous and complete before
    /// this returns.
    pub fn syscall(&mut self, sc: Syscall) -> Result<(), SimError> {
        match sc {
            Syscall::Exit { pid } => {
                self.terminate_process(ProcessId::new(pid));
                Ok(())
            }
            Syscall::AccessMemory { pid, page, modify } => {
                let owner = ProcessId::new(pid);
                let fault = {
                    let mmu = &self.mmu;
                    let process = self
                        .processes
                        .get_mut(&owner)
                        .expect("process exists for its own syscall");
                    let pte = &mut process.page_table[page];
                    mmu.access(pid, pte, page, modify).err()
                };
                match fault {
                    Some(Exception::PageFault { pid, page }) => {
                        self.handle_page_fault(ProcessId::new(pid), page, modify)
                    }
                    None => Ok(()),
                }
            }
        }
    }

    /// Free every resident frame this process holds, then drop it.
    fn terminate_process(&mut self, pid: ProcessId) {
        if let Some(process) = self.processes.remove(&pid) {
            let mut freed = 0;
            for pte in &process.page_table {
                if let Some(fid) = pte.fid() {
                    self.mmu.free(fid);
                    freed += 1;
                }
            }
            debug!(pid = pid.get(), freed, "process exited");
        }
    }

    /// Resolve residency, then complete the access that faulted (the
    /// faulting instruction retries once its page is mapped).
    fn handle_page_fault(&mut self, pid: ProcessId, page: usize, modify: bool) -> Result<(), SimError> {
        self.stats.faults += 1;

        if let Some(fid) = self.mmu.alloc(pid.get(), page) {
            let process = self
                .processes
                .get_mut(&pid)
                .expect("process exists for its own fault");
            process.page_table[page].bind(fid);
            process.page_table[page].mark_accessed(modify);
            return Ok(());
        }

        self.stats.replaced += 1;
        let (victim_pid, victim_page) =
            self.replacer.replace(&self.mmu, &mut self.processes, &mut self.rng)?;
        warn!(
            faulting_pid = pid.get(),
            page,
            victim_pid = victim_pid.get(),
            victim_page,
            "no free frame, evicting"
        );

        let victim_fid = self
            .processes
            .get_mut(&victim_pid)
            .expect("victim process exists")
            .page_table[victim_page]
            .evict();

        self.mmu.realloc(victim_fid, pid.get(), page);
        let process = self
            .processes
            .get_mut(&pid)
            .expect("process exists for its own fault");
        process.page_table[page].bind(victim_fid);
        process.page_table[page].mark_accessed(modify);
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn memory_stats(&self) -> MemoryStats {
        self.mmu.memory_stats()
    }

    pub fn access_stats(&self) -> AccessStats {
        self.stats
    }

    /// Stats for every live process, ordered by pid for stable rendering.
    pub fn process_stats(&self) -> Vec<ProcessStats> {
        let mut stats: Vec<ProcessStats> = self.processes.values().map(Process::stats).collect();
        stats.sort_by_key(|s| s.pid);
        stats
    }
}
