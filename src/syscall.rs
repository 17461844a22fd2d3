//! Tagged message carriers between a process and the kernel.
//!
//! `Syscall` and `Exception` are plain sums, not trait objects — dispatch
//! is a `match` in [`Kernel`](crate::kernel::Kernel), following the
//! teacher's own `dispatcher::dispatch_syscall` shape.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    AccessMemory { pid: u32, page: usize, modify: bool },
    Exit { pid: u32 },
}

/// A single case today, but kept a sum so the dispatcher stays extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    PageFault { pid: u32, page: usize },
}
