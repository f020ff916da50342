//! Slot arena with an intrusive, index-linked free list.

use core::cell::{RefCell, UnsafeCell};
use core::fmt;
use std::sync::Arc;

use critical_section::Mutex;

use crate::PoolStats;

type SlotIndex = u16;

/// One fixed-size block. A free slot carries the link to the next free slot
/// in the storage that would otherwise hold the payload.
enum Slot<T> {
    Free { next: Option<SlotIndex> },
    InUse(Option<T>),
}

struct FreeList {
    head: Option<SlotIndex>,
    stats: PoolStats,
}

/// A pool of `N` blocks, each large enough for one `T`.
///
/// Pools are shared through an [`Arc`] so that blocks can travel between
/// threads and come back to the pool that produced them.
pub struct MemoryPool<T, const N: usize> {
    slots: [UnsafeCell<Slot<T>>; N],
    free: Mutex<RefCell<FreeList>>,
}

// SAFETY: a slot is touched either by the single `Block` that owns it or,
// while it is free, only inside the critical section. Payloads may be read
// through `&Block` from any thread, hence `T: Sync`.
unsafe impl<T: Send + Sync, const N: usize> Sync for MemoryPool<T, N> {}

impl<T, const N: usize> MemoryPool<T, N> {
    /// Size in bytes of one block, link overlay included.
    pub const BLOCK_SIZE: usize = core::mem::size_of::<Slot<T>>();

    /// Initialise a pool with every block on the free list.
    ///
    /// # Panics
    ///
    /// Panics if `N` is zero or does not fit a 16-bit block index.
    pub fn new() -> Self {
        assert!(
            N > 0 && N <= SlotIndex::MAX as usize,
            "pool capacity must be within 1..=65535 blocks"
        );

        let slots = core::array::from_fn(|i| {
            let next = if i + 1 < N {
                Some((i + 1) as SlotIndex)
            } else {
                None
            };
            UnsafeCell::new(Slot::Free { next })
        });

        Self {
            slots,
            free: Mutex::new(RefCell::new(FreeList {
                head: Some(0),
                stats: PoolStats::new(N),
            })),
        }
    }

    /// Convenience constructor returning the pool ready for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Check out one block, or `None` when the pool is exhausted.
    ///
    /// Never blocks and never allocates; exhaustion is an expected outcome.
    pub fn acquire(self: &Arc<Self>) -> Option<Block<T, N>> {
        let index = critical_section::with(|cs| {
            let mut list = self.free.borrow_ref_mut(cs);
            let index = list.head?;

            // SAFETY: `index` is on the free list, so no block owns it and we
            // hold the critical section.
            let slot = unsafe { &mut *self.slots[index as usize].get() };
            let next = match slot {
                Slot::Free { next } => *next,
                Slot::InUse(_) => panic!("pool free list links a block that is in use"),
            };
            *slot = Slot::InUse(None);

            list.head = next;
            list.stats.on_alloc();
            Some(index)
        })?;

        Some(Block {
            pool: Arc::clone(self),
            index,
        })
    }

    /// Check out one block and store `value` in it.
    ///
    /// Hands `value` back when the pool is exhausted.
    pub fn alloc(self: &Arc<Self>, value: T) -> Result<Block<T, N>, T> {
        match self.acquire() {
            Some(mut block) => {
                block.write(value);
                Ok(block)
            }
            None => Err(value),
        }
    }

    /// Return a block to the pool. `None` is accepted and ignored.
    ///
    /// Dropping a [`Block`] has the same effect; this method exists for call
    /// sites that release explicitly.
    ///
    /// # Panics
    ///
    /// Panics if the block was produced by a different pool.
    pub fn release(&self, block: Option<Block<T, N>>) {
        if let Some(block) = block {
            assert!(
                core::ptr::eq(Arc::as_ptr(&block.pool), self),
                "block released into a pool that did not produce it"
            );
            drop(block);
        }
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        critical_section::with(|cs| self.free.borrow_ref(cs).stats)
    }

    fn relink(&self, index: SlotIndex) {
        critical_section::with(|cs| {
            let mut list = self.free.borrow_ref_mut(cs);
            // SAFETY: the caller owned `index` until now and has already moved
            // the payload out; we hold the critical section.
            let slot = unsafe { &mut *self.slots[index as usize].get() };
            *slot = Slot::Free { next: list.head };
            list.head = Some(index);
            list.stats.on_dealloc();
        });
    }

    /// Number of blocks reachable by walking the free-list links.
    #[cfg(test)]
    pub(crate) fn walk_free_list(&self) -> usize {
        critical_section::with(|cs| {
            let list = self.free.borrow_ref(cs);
            let mut cursor = list.head;
            let mut count = 0;
            while let Some(index) = cursor {
                count += 1;
                assert!(count <= N, "free list contains a cycle");
                // SAFETY: free slots are only touched inside the critical section.
                cursor = match unsafe { &*self.slots[index as usize].get() } {
                    Slot::Free { next } => *next,
                    Slot::InUse(_) => panic!("free list links a block that is in use"),
                };
            }
            count
        })
    }
}

impl<T, const N: usize> Default for MemoryPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for MemoryPool<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPool")
            .field("block_size", &Self::BLOCK_SIZE)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Exclusive ownership of one pool block.
///
/// Moving a `Block` moves ownership of the storage, which is how events are
/// handed from a producer to an active object. The block goes back to its
/// pool when dropped.
pub struct Block<T, const N: usize> {
    pool: Arc<MemoryPool<T, N>>,
    index: SlotIndex,
}

impl<T, const N: usize> Block<T, N> {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// The pool this block belongs to.
    pub fn pool(&self) -> &Arc<MemoryPool<T, N>> {
        &self.pool
    }

    /// Store `value`, returning whatever the block held before.
    pub fn write(&mut self, value: T) -> Option<T> {
        self.payload_mut().replace(value)
    }

    pub fn get(&self) -> Option<&T> {
        self.payload().as_ref()
    }

    /// Move the payload out, leaving the block empty.
    pub fn take(&mut self) -> Option<T> {
        self.payload_mut().take()
    }

    fn payload(&self) -> &Option<T> {
        // SAFETY: this block is the only owner of its slot.
        match unsafe { &*self.pool.slots[self.index as usize].get() } {
            Slot::InUse(payload) => payload,
            Slot::Free { .. } => unreachable!("owned block found on the free list"),
        }
    }

    fn payload_mut(&mut self) -> &mut Option<T> {
        // SAFETY: this block is the only owner of its slot and we hold it
        // mutably.
        match unsafe { &mut *self.pool.slots[self.index as usize].get() } {
            Slot::InUse(payload) => payload,
            Slot::Free { .. } => unreachable!("owned block found on the free list"),
        }
    }
}

impl<T, const N: usize> Drop for Block<T, N> {
    fn drop(&mut self) {
        // Payload destructors run outside the critical section.
        drop(self.take());
        self.pool.relink(self.index);
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for Block<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("index", &self.index)
            .field("payload", self.payload())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small deterministic generator so failures are reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }
    }

    #[test]
    fn fresh_pool_links_every_block() {
        let pool: Arc<MemoryPool<u32, 10>> = MemoryPool::shared();
        assert_eq!(pool.walk_free_list(), 10);
        assert_eq!(pool.stats(), PoolStats::new(10));
    }

    #[test]
    fn acquire_until_exhausted_then_recover() {
        let pool: Arc<MemoryPool<u32, 3>> = MemoryPool::shared();

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());
        assert!(pool.stats().is_exhausted());
        assert_eq!(pool.walk_free_list(), 0);

        pool.release(Some(b));
        let again = pool.acquire().expect("released block is reusable");
        assert!(pool.acquire().is_none());

        drop((a, c, again));
        assert_eq!(pool.walk_free_list(), 3);
        assert_eq!(pool.stats().min_free_blocks, 0);
    }

    #[test]
    fn release_none_is_a_noop() {
        let pool: Arc<MemoryPool<u32, 2>> = MemoryPool::shared();
        pool.release(None);
        assert_eq!(pool.stats().free_blocks, 2);
        assert_eq!(pool.walk_free_list(), 2);
    }

    #[test]
    fn conservation_holds_for_random_sequences() {
        const N: usize = 8;
        let pool: Arc<MemoryPool<u64, N>> = MemoryPool::shared();
        let mut rng = Lcg(0x5eed);
        let mut outstanding = Vec::new();

        for step in 0..5_000u64 {
            if rng.next() % 2 == 0 {
                match pool.acquire() {
                    Some(mut block) => {
                        block.write(step);
                        outstanding.push(block);
                    }
                    None => assert_eq!(outstanding.len(), N),
                }
            } else if !outstanding.is_empty() {
                let victim = (rng.next() as usize) % outstanding.len();
                let block = outstanding.swap_remove(victim);
                pool.release(Some(block));
            }

            assert_eq!(pool.walk_free_list() + outstanding.len(), N);
            let stats = pool.stats();
            assert_eq!(stats.free_blocks + stats.used_blocks, N);
            assert_eq!(stats.used_blocks, outstanding.len());
        }
    }

    #[test]
    fn payload_belongs_to_the_owner() {
        let pool: Arc<MemoryPool<String, 2>> = MemoryPool::shared();
        let mut block = pool.acquire().unwrap();
        assert!(block.get().is_none());

        assert_eq!(block.write("first".to_string()), None);
        assert_eq!(block.get().map(String::as_str), Some("first"));
        assert_eq!(block.write("second".to_string()).as_deref(), Some("first"));
        assert_eq!(block.take().as_deref(), Some("second"));
        assert!(block.get().is_none());
    }

    #[test]
    fn alloc_hands_value_back_when_exhausted() {
        let pool: Arc<MemoryPool<u8, 1>> = MemoryPool::shared();
        let held = pool.alloc(1).unwrap();
        assert_eq!(pool.alloc(2).unwrap_err(), 2);
        drop(held);
        assert_eq!(pool.alloc(3).unwrap().get(), Some(&3));
    }

    #[test]
    fn dropping_a_block_drops_its_payload() {
        let marker = Arc::new(());
        let pool: Arc<MemoryPool<Arc<()>, 1>> = MemoryPool::shared();
        let block = pool.alloc(Arc::clone(&marker)).unwrap();
        assert_eq!(Arc::strong_count(&marker), 2);
        drop(block);
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    #[should_panic(expected = "did not produce it")]
    fn foreign_release_is_fatal() {
        let a: Arc<MemoryPool<u8, 1>> = MemoryPool::shared();
        let b: Arc<MemoryPool<u8, 1>> = MemoryPool::shared();
        let block = a.acquire().unwrap();
        b.release(Some(block));
    }

    #[test]
    fn block_size_covers_the_link() {
        assert!(MemoryPool::<u8, 1>::BLOCK_SIZE >= core::mem::size_of::<Option<SlotIndex>>());
    }
}
