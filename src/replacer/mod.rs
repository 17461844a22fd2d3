//! Pluggable page-replacement policies.
//!
//! A `Replacer` is a capability — `{ replace() -> victim }` — rather than
//! a class hierarchy, with a small registry keyed by policy name. This
//! mirrors the teacher's own match-based dispatch tables
//! (`syscall::dispatcher::dispatch_syscall`) generalized to a trait object
//! since the policy is chosen once, at startup, from a CLI string.

mod clock;
mod random;

use std::collections::HashMap;

use rand::RngCore;

use crate::error::SimError;
use crate::mmu::Mmu;
use crate::process::{Process, ProcessId};

pub use clock::ClockReplacer;
pub use random::RandomReplacer;

/// Selects a victim page from the set of currently-resident pages.
///
/// Implementations must not themselves clear `presented` or mutate the
/// frame table — the caller (the kernel's fault handler) does that, so
/// that the eviction and the new mapping happen atomically from the
/// kernel's point of view.
pub trait Replacer {
    fn replace(
        &mut self,
        mmu: &Mmu,
        processes: &mut HashMap<ProcessId, Process>,
        rng: &mut dyn RngCore,
    ) -> Result<(ProcessId, usize), SimError>;
}

/// Build a replacer from its registry name. Fails fast on unknown names,
/// per spec.md §4.6.
pub fn build(name: &str) -> Result<Box<dyn Replacer>, SimError> {
    match name {
        "clock" => Ok(Box::new(ClockReplacer::new())),
        "random" => Ok(Box::new(RandomReplacer)),
        other => Err(SimError::UnknownPolicy(other.to_string())),
    }
}
