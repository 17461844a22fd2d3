//! The physical frame pool. A pure data structure over frame state — no
//! replacement policy lives here, and the only thing it can signal is
//! non-residency (see [`Exception`](crate::syscall::Exception)).

use crate::page_table::PageTableEntry;
use crate::syscall::Exception;
use std::collections::VecDeque;

/// A physical page frame, identified by a dense 0-based id.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub fid: usize,
    pub busy: bool,
    pub pid: Option<u32>,
    pub page: Option<usize>,
}

impl Frame {
    fn free(fid: usize) -> Self {
        Frame { fid, busy: false, pid: None, page: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryStats {
    pub total: usize,
    pub busy: usize,
    pub free: usize,
    pub load_percent: f64,
}

#[derive(Debug)]
pub struct Mmu {
    frames: Vec<Frame>,
    free_list: VecDeque<usize>,
    /// Busy fids in insertion order. The clock replacer needs a stable
    /// snapshot ordering across calls; this is the "parallel ordered
    /// structure" spec.md §4.5 allows for.
    busy_order: Vec<usize>,
}

impl Mmu {
    pub fn new(total_frames: usize) -> Self {
        Mmu {
            frames: (0..total_frames).map(Frame::free).collect(),
            free_list: (0..total_frames).collect(),
            busy_order: Vec::new(),
        }
    }

    pub fn frame(&self, fid: usize) -> &Frame {
        &self.frames[fid]
    }

    /// Busy fids in stable insertion order, for the clock replacer's hand.
    pub fn busy_fids(&self) -> &[usize] {
        &self.busy_order
    }

    /// Pop a free frame and bind it to `(pid, page)`. `None` if the free
    /// list is exhausted.
    pub fn alloc(&mut self, pid: u32, page: usize) -> Option<usize> {
        let fid = self.free_list.pop_front()?;
        let frame = &mut self.frames[fid];
        frame.busy = true;
        frame.pid = Some(pid);
        frame.page = Some(page);
        self.busy_order.push(fid);
        Some(fid)
    }

    /// Free a busy frame. Idempotent no-op (`false`) on an already-free fid.
    pub fn free(&mut self, fid: usize) -> bool {
        if !self.frames[fid].busy {
            return false;
        }
        self.frames[fid] = Frame::free(fid);
        self.busy_order.retain(|&f| f != fid);
        self.free_list.push_back(fid);
        true
    }

    /// Unconditionally rewrite a busy frame's `(pid, page)` binding. Used
    /// by the fault handler to repurpose a victim frame without cycling it
    /// through the free list.
    pub fn realloc(&mut self, fid: usize, pid: u32, page: usize) -> bool {
        debug_assert!(self.frames[fid].busy, "realloc on a free frame");
        let frame = &mut self.frames[fid];
        frame.pid = Some(pid);
        frame.page = Some(page);
        true
    }

    /// Fails with `Exception::PageFault` when `pte` is non-resident;
    /// otherwise records the access on `pte` itself.
    pub fn access(
        &self,
        pid: u32,
        pte: &mut PageTableEntry,
        page: usize,
        modify: bool,
    ) -> Result<(), Exception> {
        if !pte.is_resident() {
            return Err(Exception::PageFault { pid, page });
        }
        pte.mark_accessed(modify);
        Ok(())
    }

    pub fn memory_stats(&self) -> MemoryStats {
        let total = self.frames.len();
        let busy = self.busy_order.len();
        let free = total - busy;
        let load_percent = if total == 0 { 0.0 } else { 100.0 * busy as f64 / total as f64 };
        MemoryStats { total, busy, free, load_percent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_exhausts_free_list() {
        let mut mmu = Mmu::new(2);
        assert!(mmu.alloc(1, 0).is_some());
        assert!(mmu.alloc(1, 1).is_some());
        assert_eq!(mmu.alloc(1, 2), None);
    }

    #[test]
    fn free_is_idempotent_on_free_fid() {
        let mut mmu = Mmu::new(1);
        let fid = mmu.alloc(1, 0).unwrap();
        assert!(mmu.free(fid));
        assert!(!mmu.free(fid));
    }

    #[test]
    fn alloc_then_free_restores_state() {
        let mut mmu = Mmu::new(4);
        let before = mmu.memory_stats();
        let fid = mmu.alloc(1, 0).unwrap();
        mmu.free(fid);
        let after = mmu.memory_stats();
        assert_eq!(before, after);
        assert!(!mmu.frame(fid).busy);
        assert_eq!(mmu.frame(fid).pid, None);
    }

    #[test]
    fn alloc_realloc_free_matches_alloc_free_membership() {
        let mut mmu_a = Mmu::new(4);
        let fid_a = mmu_a.alloc(1, 0).unwrap();
        mmu_a.free(fid_a);

        let mut mmu_b = Mmu::new(4);
        let fid_b = mmu_b.alloc(1, 0).unwrap();
        mmu_b.realloc(fid_b, 2, 5);
        mmu_b.free(fid_b);

        assert_eq!(mmu_a.memory_stats(), mmu_b.memory_stats());
        assert_eq!(mmu_a.busy_fids(), mmu_b.busy_fids());
    }

    #[test]
    fn busy_and_free_partition_all_fids() {
        let mut mmu = Mmu::new(5);
        mmu.alloc(1, 0);
        mmu.alloc(1, 1);
        let busy: std::collections::HashSet<_> = mmu.busy_fids().iter().copied().collect();
        let mut all: Vec<usize> = busy.iter().copied().collect();
        all.extend(mmu.free_list.iter().copied());
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
        assert!(busy.is_disjoint(&mmu.free_list.iter().copied().collect()));
    }

    #[test]
    fn access_faults_on_non_resident_pte() {
        let mmu = Mmu::new(1);
        let mut pte = PageTableEntry::new();
        let err = mmu.access(42, &mut pte, 3, false).unwrap_err();
        assert_eq!(err, Exception::PageFault { pid: 42, page: 3 });
    }

    #[test]
    fn access_sets_reference_and_modify_bits() {
        let mmu = Mmu::new(1);
        let mut pte = PageTableEntry::new();
        pte.bind(0);
        mmu.access(1, &mut pte, 0, true).unwrap();
        assert!(pte.referenced());
        assert!(pte.modified());
    }
}
