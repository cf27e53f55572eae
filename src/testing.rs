//! Allocators and element types that make failures observable in tests.

use crate::alloc::{AllocPolicy, Allocator, Global};
use crate::error::AllocError;
use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

#[derive(Debug, Default)]
pub(crate) struct AllocStats {
    allocs: Cell<usize>,
    deallocs: Cell<usize>,
    budget: Cell<Option<usize>>,
}

impl AllocStats {
    /// Successful allocations so far.
    pub(crate) fn allocs(&self) -> usize {
        self.allocs.get()
    }

    pub(crate) fn deallocs(&self) -> usize {
        self.deallocs.get()
    }

    /// Blocks allocated and not yet released.
    pub(crate) fn live(&self) -> usize {
        self.allocs() - self.deallocs()
    }

    /// Let the next `n` allocations succeed and every later one fail.
    pub(crate) fn fail_after(&self, n: usize) {
        self.budget.set(Some(n));
    }

    pub(crate) fn never_fail(&self) {
        self.budget.set(None);
    }
}

/// Counts the blocks it hands out, and fails on demand.
///
/// Allocators compare equal when they have the same `id`.
#[derive(Debug, Clone)]
pub(crate) struct CountingAlloc {
    id: u32,
    stats: Rc<AllocStats>,
}

impl CountingAlloc {
    pub(crate) fn new(id: u32) -> Self {
        let stats = Rc::default();
        Self { id, stats }
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn stats(&self) -> &AllocStats {
        &self.stats
    }
}

impl PartialEq for CountingAlloc {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Allocator for CountingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if let Some(budget) = self.stats.budget.get() {
            if budget == 0 {
                return Err(AllocError::new(layout));
            }
            self.stats.budget.set(Some(budget - 1));
        }
        let ptr = Global.allocate(layout)?;
        self.stats.allocs.set(self.stats.allocs() + 1);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.stats.deallocs.set(self.stats.deallocs() + 1);
        Global.deallocate(ptr, layout)
    }
}

/// A [`CountingAlloc`] that follows its source on clone-assignment, and starts
/// over with a fresh allocator (`id` 0) on copy construction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PropagatingAlloc(CountingAlloc);

impl PropagatingAlloc {
    pub(crate) fn new(id: u32) -> Self {
        Self(CountingAlloc::new(id))
    }

    pub(crate) fn id(&self) -> u32 {
        self.0.id()
    }

    pub(crate) fn stats(&self) -> &AllocStats {
        self.0.stats()
    }
}

impl Allocator for PropagatingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.0.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.0.deallocate(ptr, layout)
    }

    fn policy() -> AllocPolicy<Self> {
        AllocPolicy {
            propagate_on_copy_assignment: true,
            select_on_copy_construction: |_| PropagatingAlloc::new(0),
        }
    }
}

/// An element whose `clone` panics once a shared budget of clones runs out.
#[derive(Debug)]
pub(crate) struct Fragile {
    pub(crate) value: i32,
    clones_left: Rc<Cell<usize>>,
}

impl Fragile {
    pub(crate) fn new(value: i32, clones_left: &Rc<Cell<usize>>) -> Self {
        let clones_left = Rc::clone(clones_left);
        Self { value, clones_left }
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        let left = self.clones_left.get();
        if left == 0 {
            panic!("clone budget of `Fragile` exhausted");
        }
        self.clones_left.set(left - 1);
        Self::new(self.value, &self.clones_left)
    }
}

impl PartialEq for Fragile {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
