use crate::{muted_error, weak_error};
use nix::unistd::{sysconf, SysconfVar};
use std::hint;

/// Page size used when the platform does not report one.
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// Platform memory page size in bytes.
pub fn page_size() -> usize {
    let reported = weak_error!(sysconf(SysconfVar::PAGE_SIZE), "page size:").flatten();
    match reported.and_then(|sz| usize::try_from(sz).ok()) {
        Some(sz) if sz > 0 => sz,
        _ => FALLBACK_PAGE_SIZE,
    }
}

/// Source of memory blocks for the hog loop.
pub trait PageSource {
    /// Allocate a block of `size` bytes and commit it by writing its first byte.
    /// Return false if allocation fails, in this case nothing is written.
    fn grab(&mut self, size: usize) -> bool;
}

/// Allocates blocks from the global allocator and abandons them forever.
#[derive(Default)]
pub struct LeakingPages;

impl PageSource for LeakingPages {
    fn grab(&mut self, size: usize) -> bool {
        let mut block: Vec<u8> = Vec::new();
        if muted_error!(block.try_reserve_exact(size), "page allocation:").is_none() {
            return false;
        }

        block.push(0);
        // keep the write observable, otherwise the whole block may be optimized out
        hint::black_box(block.leak());
        true
    }
}
