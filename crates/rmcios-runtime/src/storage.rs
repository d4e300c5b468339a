//! Slab allocator behind the storage channels.
//!
//! Handles are slot indexes offset by one so that `0` stays the "no
//! storage" sentinel on the wire. Freed slots are reused.

pub(crate) struct Slab {
    blocks: Vec<Option<Vec<u8>>>,
    free: Vec<usize>,
}

impl Slab {
    pub(crate) fn new() -> Self {
        Self {
            blocks: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Allocate a zeroed block, returning its handle. `0` on refusal
    /// (zero-sized requests are refused).
    pub(crate) fn allocate(&mut self, size: usize) -> u64 {
        if size == 0 {
            return 0;
        }
        let block = vec![0u8; size];
        let index = match self.free.pop() {
            Some(index) => {
                self.blocks[index] = Some(block);
                index
            }
            None => {
                self.blocks.push(Some(block));
                self.blocks.len() - 1
            }
        };
        index as u64 + 1
    }

    /// Release a block. False when the handle names no live block.
    pub(crate) fn release(&mut self, handle: u64) -> bool {
        let Some(index) = handle.checked_sub(1) else {
            return false;
        };
        let index = index as usize;
        match self.blocks.get_mut(index) {
            Some(slot @ Some(_)) => {
                *slot = None;
                self.free.push(index);
                true
            }
            _ => false,
        }
    }

    /// Size in bytes of a live block.
    pub(crate) fn size_of(&self, handle: u64) -> Option<usize> {
        let index = handle.checked_sub(1)? as usize;
        self.blocks.get(index)?.as_ref().map(Vec::len)
    }

    /// Count of live blocks.
    pub(crate) fn live(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_start_at_one() {
        let mut slab = Slab::new();
        assert_eq!(slab.allocate(16), 1);
        assert_eq!(slab.allocate(32), 2);
        assert_eq!(slab.live(), 2);
        assert_eq!(slab.size_of(1), Some(16));
        assert_eq!(slab.size_of(2), Some(32));
    }

    #[test]
    fn zero_sized_requests_are_refused() {
        let mut slab = Slab::new();
        assert_eq!(slab.allocate(0), 0);
        assert_eq!(slab.live(), 0);
    }

    #[test]
    fn released_slots_are_reused() {
        let mut slab = Slab::new();
        let first = slab.allocate(8);
        let second = slab.allocate(8);
        assert!(slab.release(first));
        assert_eq!(slab.live(), 1);
        assert_eq!(slab.allocate(4), first);
        assert_eq!(slab.size_of(second), Some(8));
    }

    #[test]
    fn bogus_handles_are_rejected() {
        let mut slab = Slab::new();
        let handle = slab.allocate(8);
        assert!(!slab.release(0));
        assert!(!slab.release(99));
        assert!(slab.release(handle));
        assert!(!slab.release(handle));
        assert_eq!(slab.size_of(handle), None);
    }
}
