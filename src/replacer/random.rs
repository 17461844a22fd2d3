use std::collections::HashMap;

use rand::RngCore;

use super::Replacer;
use crate::error::SimError;
use crate::mmu::Mmu;
use crate::process::{Process, ProcessId};
use crate::rng::pick;

/// Uniformly picks a victim among the currently-busy frames.
pub struct RandomReplacer;

impl Replacer for RandomReplacer {
    fn replace(
        &mut self,
        mmu: &Mmu,
        processes: &mut HashMap<ProcessId, Process>,
        rng: &mut dyn RngCore,
    ) -> Result<(ProcessId, usize), SimError> {
        let busy = mmu.busy_fids();
        if busy.is_empty() {
            return Err(SimError::EmptyBusySet);
        }
        let fid = *pick(rng, busy);
        let frame = mmu.frame(fid);
        let pid = frame.pid.expect("busy frame with no pid");
        let page = frame.page.expect("busy frame with no page");
        let owner = ProcessId::new(pid);
        if !processes.contains_key(&owner) {
            return Err(SimError::DanglingFrame { fid, pid });
        }
        Ok((owner, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn picks_a_resident_frame() {
        let mut mmu = Mmu::new(3);
        let mut rng = StdRng::seed_from_u64(1);
        mmu.alloc(1000, 0);
        mmu.alloc(1000, 1);

        let mut processes = HashMap::new();
        processes.insert(ProcessId::new(1000), Process::new(ProcessId::new(1000), &mut rng));

        let mut replacer = RandomReplacer;
        for _ in 0..20 {
            let (pid, page) = replacer.replace(&mmu, &mut processes, &mut rng).unwrap();
            assert_eq!(pid, ProcessId::new(1000));
            assert!(page == 0 || page == 1);
        }
    }

    #[test]
    fn errors_on_empty_busy_set() {
        let mmu = Mmu::new(2);
        let mut processes = HashMap::new();
        let mut replacer = RandomReplacer;
        let mut rng = StdRng::seed_from_u64(0);
        assert!(replacer.replace(&mmu, &mut processes, &mut rng).is_err());
    }
}
