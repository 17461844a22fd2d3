//! Fatal invariant violations.
//!
//! These are distinct from the recoverable sentinels returned by the MMU
//! (`Option`/`bool`) and from `Exception`, which is expected control flow.
//! A `SimError` means a bug: the process logs it and exits non-zero.

use std::fmt;

#[derive(Debug)]
pub enum SimError {
    /// Construction requested a replacement policy not in the registry.
    UnknownPolicy(String),
    /// `Replacer::replace` was called with no resident frames to choose from.
    EmptyBusySet,
    /// A busy frame names a pid with no corresponding live process.
    DanglingFrame { fid: usize, pid: u32 },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UnknownPolicy(name) => {
                write!(f, "unknown replacement policy '{name}' (expected clock or random)")
            }
            SimError::EmptyBusySet => {
                write!(f, "replace() called with no resident frames")
            }
            SimError::DanglingFrame { fid, pid } => {
                write!(f, "frame {fid} names pid {pid}, which has no live process")
            }
        }
    }
}

impl std::error::Error for SimError {}
