//! Node allocation for [`List`](crate::List).
//!
//! A list never hardcodes where its nodes live. It is parameterized by an
//! [`Allocator`], which hands out untyped memory blocks, and rebinds it to its
//! own node type through [`NodeAllocator`]. The allocator type also decides,
//! through its [`AllocPolicy`], how a list's allocator travels along when the
//! list is cloned or clone-assigned.

use crate::error::AllocError;
use crate::list::Node;
use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

/// A strategy for obtaining and releasing memory blocks.
///
/// Two allocators that compare equal must be able to release each other's
/// blocks. A list relies on this when it exchanges its nodes with another
/// list during [`clone_from`](Clone::clone_from).
///
/// # Examples
///
/// ```
/// use sentinel_list::alloc::{Allocator, Global};
/// use sentinel_list::List;
///
/// let mut list = List::new_in(Global);
/// list.push_back(1);
/// assert_eq!(list.get_allocator(), Global);
/// ```
pub trait Allocator: Clone + PartialEq {
    /// Attempts to allocate a block of memory fitting `layout`.
    ///
    /// `layout` is never zero-sized when called by a list.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases the block referenced by `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`Allocator::allocate`] on this
    /// allocator, or one that compares equal to it, with the same `layout`,
    /// and must not have been released already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// How containers carry this allocator through copies.
    fn policy() -> AllocPolicy<Self> {
        AllocPolicy::default()
    }
}

/// Allocator propagation rules applied by [`List`](crate::List) on copies.
pub struct AllocPolicy<A> {
    /// Whether clone-assignment replaces the destination's allocator with the
    /// source's when the two compare unequal.
    pub propagate_on_copy_assignment: bool,
    /// Produces the allocator of a fresh copy from the source's allocator.
    pub select_on_copy_construction: fn(&A) -> A,
}

/// Clone-assignment keeps the destination's allocator, and copies reuse a
/// clone of the source's allocator.
impl<A: Clone> Default for AllocPolicy<A> {
    fn default() -> Self {
        Self {
            propagate_on_copy_assignment: false,
            select_on_copy_construction: A::clone,
        }
    }
}

impl<A> Clone for AllocPolicy<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for AllocPolicy<A> {}

impl<A> fmt::Debug for AllocPolicy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocPolicy")
            .field(
                "propagate_on_copy_assignment",
                &self.propagate_on_copy_assignment,
            )
            .finish()
    }
}

/// The global memory allocator, as registered with `#[global_allocator]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Global;

impl Allocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert_ne!(layout.size(), 0, "zero-sized node layout");
        // SAFETY: node layouts always contain two links, so they are never
        // zero-sized.
        NonNull::new(unsafe { alloc::alloc(layout) }).ok_or_else(|| AllocError::new(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        alloc::dealloc(ptr.as_ptr(), layout)
    }
}

/// An [`Allocator`] rebound to the nodes of a `List<T, _>`.
pub(crate) struct NodeAllocator<T, A> {
    alloc: A,
    _marker: PhantomData<fn() -> T>,
}

impl<T, A: Allocator> NodeAllocator<T, A> {
    const LAYOUT: Layout = Layout::new::<Node<T>>();

    pub(crate) fn new(alloc: A) -> Self {
        let _marker = PhantomData;
        Self { alloc, _marker }
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Allocate the memory of one node, without constructing it.
    ///
    /// The memory is released again if the returned guard is dropped before
    /// [`UninitNode::init`] is called.
    pub(crate) fn allocate_node(&self) -> Result<UninitNode<'_, T, A>, AllocError> {
        let ptr = self.alloc.allocate(Self::LAYOUT)?.cast();
        Ok(UninitNode { ptr, nodes: self })
    }

    /// Allocate and construct a self-linked node holding `element`.
    ///
    /// On failure `element` is dropped.
    pub(crate) fn new_node(&self, element: T) -> Result<NonNull<Node<T>>, AllocError> {
        Ok(self.allocate_node()?.init(element))
    }

    /// Destroy a node and release its memory, returning the element it held.
    ///
    /// It is unsafe because `node` must have been produced by this allocator
    /// (or an equal one), must be detached from any list, and must not be used
    /// afterwards.
    pub(crate) unsafe fn free_node(&self, node: NonNull<Node<T>>) -> Option<T> {
        let Node { element, .. } = ptr::read(node.as_ptr());
        self.alloc.deallocate(node.cast(), Self::LAYOUT);
        element
    }
}

/// A node whose memory is allocated but not yet constructed.
pub(crate) struct UninitNode<'a, T, A: Allocator> {
    ptr: NonNull<Node<T>>,
    nodes: &'a NodeAllocator<T, A>,
}

impl<'a, T, A: Allocator> UninitNode<'a, T, A> {
    /// Construct the node in place. The new node links to itself in both
    /// directions.
    pub(crate) fn init(self, element: T) -> NonNull<Node<T>> {
        let ptr = self.ptr;
        let node = Node {
            next: ptr,
            prev: ptr,
            element: Some(element),
        };
        // SAFETY: `ptr` is a fresh allocation with the layout of `Node<T>`.
        unsafe { ptr::write(ptr.as_ptr(), node) };
        mem::forget(self);
        ptr
    }
}

impl<'a, T, A: Allocator> Drop for UninitNode<'a, T, A> {
    fn drop(&mut self) {
        // SAFETY: the node was never constructed, so only the memory is
        // released.
        unsafe {
            self.nodes
                .alloc
                .deallocate(self.ptr.cast(), NodeAllocator::<T, A>::LAYOUT)
        }
    }
}
