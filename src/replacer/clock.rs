use std::collections::HashMap;

use rand::RngCore;

use super::Replacer;
use crate::error::SimError;
use crate::mmu::Mmu;
use crate::process::{Process, ProcessId};

/// Second-chance clock. Holds a persistent hand into the busy-frame
/// snapshot exposed by [`Mmu::busy_fids`], clamped to the current length
/// on every call since the busy set can shrink between calls as processes
/// exit.
pub struct ClockReplacer {
    hand: usize,
}

impl ClockReplacer {
    pub fn new() -> Self {
        ClockReplacer { hand: 0 }
    }
}

impl Replacer for ClockReplacer {
    fn replace(
        &mut self,
        mmu: &Mmu,
        processes: &mut HashMap<ProcessId, Process>,
        _rng: &mut dyn RngCore,
    ) -> Result<(ProcessId, usize), SimError> {
        let busy = mmu.busy_fids();
        if busy.is_empty() {
            return Err(SimError::EmptyBusySet);
        }
        if self.hand >= busy.len() {
            self.hand = busy.len() - 1;
        }

        loop {
            let fid = busy[self.hand];
            self.hand = (self.hand + 1) % busy.len();

            let frame = mmu.frame(fid);
            let pid = frame.pid.expect("busy frame with no pid");
            let page = frame.page.expect("busy frame with no page");
            let owner = ProcessId::new(pid);
            let process = processes
                .get_mut(&owner)
                .ok_or(SimError::DanglingFrame { fid, pid })?;
            let pte = &mut process.page_table[page];

            if !pte.referenced() {
                return Ok((owner, page));
            }
            pte.clear_referenced();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_table::PageTableEntry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn process_with_residents(id: u32, residents: &[(usize, usize, bool)]) -> Process {
        // residents: (page, fid, referenced) — fid unused by Process itself,
        // kept here only for readability at call sites.
        let mut rng = StdRng::seed_from_u64(id as u64);
        let max_page = residents.iter().map(|(p, ..)| *p).max().unwrap_or(0);
        let mut process = Process::new(ProcessId::new(id), &mut rng);
        while process.page_table.len() <= max_page {
            process.page_table.push(PageTableEntry::new());
        }
        for &(page, fid, referenced) in residents {
            process.page_table[page].bind(fid);
            if referenced {
                process.page_table[page].mark_accessed(false);
            }
        }
        process
    }

    #[test]
    fn second_chance_clears_then_returns_first_unreferenced() {
        let mut mmu = Mmu::new(2);
        let fid0 = mmu.alloc(1000, 0).unwrap();
        let fid1 = mmu.alloc(1000, 1).unwrap();

        let mut processes = HashMap::new();
        processes.insert(
            ProcessId::new(1000),
            process_with_residents(1000, &[(0, fid0, true), (1, fid1, true)]),
        );

        let mut replacer = ClockReplacer::new();
        let mut rng = StdRng::seed_from_u64(0);

        // First call: sweeps through both (clearing bits), lands back on
        // page 0 which is now unreferenced.
        let (victim_pid, victim_page) = replacer
            .replace(&mmu, &mut processes, &mut rng)
            .expect("resident frames available");
        assert_eq!(victim_pid, ProcessId::new(1000));
        assert_eq!(victim_page, 0);
    }

    #[test]
    fn errors_on_empty_busy_set() {
        let mmu = Mmu::new(2);
        let mut processes = HashMap::new();
        let mut replacer = ClockReplacer::new();
        let mut rng = StdRng::seed_from_u64(0);
        let err = replacer.replace(&mmu, &mut processes, &mut rng).unwrap_err();
        matches!(err, SimError::EmptyBusySet);
    }

    #[test]
    fn errors_on_dangling_frame() {
        let mut mmu = Mmu::new(1);
        mmu.alloc(9999, 0);
        let mut processes = HashMap::new(); // no process 9999
        let mut replacer = ClockReplacer::new();
        let mut rng = StdRng::seed_from_u64(0);
        let err = replacer.replace(&mmu, &mut processes, &mut rng).unwrap_err();
        matches!(err, SimError::DanglingFrame { .. });
    }
}
