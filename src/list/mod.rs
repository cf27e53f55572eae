use std::alloc::handle_alloc_error;
use std::convert::Infallible;
use std::fmt::{Debug, Formatter};
use std::iter;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::alloc::{Allocator, Global, NodeAllocator};
use crate::error::{AllocError, BuildError};
use crate::list::cursor::{Cursor, CursorMut, Forward, Reverse};
use crate::{IntoIter, Iter, IterMut};

pub mod cursor;
pub mod iterator;

mod algorithms;

/// The `List` is a doubly-linked list with owned nodes, implemented as a cyclic list
/// anchored by a ghost node.
///
/// It allows inserting and removing elements at both ends in constant time, and
/// walking the list in both directions with cursors.
///
/// The `List` contains:
/// - a pointer `ghost` that points to the ghost node, which carries no element;
/// - a length field `len` indicating the length of the list;
/// - the allocator `A`, rebound to the node type, that every element node is
///   allocated from.
///
/// # Naming Conventions
///
/// - `front..=back`: a closed range of list nodes, both inclusive;
/// - `start..end`: a half-open range of list nodes, left inclusive and right
///   exclusive (probably the ghost node).
pub struct List<T, A: Allocator = Global> {
    ghost: NonNull<Node<T>>,
    /// the length of the list
    pub(crate) len: usize,
    nodes: NodeAllocator<T, A>,
    _marker: PhantomData<Box<Node<T>>>,
}

/// A node of the list.
///
/// Element nodes hold `Some(element)`; the ghost node is the only node holding
/// `None`.
pub(crate) struct Node<T> {
    pub(crate) next: NonNull<Node<T>>,
    pub(crate) prev: NonNull<Node<T>>,
    pub(crate) element: Option<T>,
}

/// Link `prev` and `next` as adjacent nodes.
///
/// It is unsafe because both nodes must be valid.
pub(crate) unsafe fn connect<T>(mut prev: NonNull<Node<T>>, mut next: NonNull<Node<T>>) {
    prev.as_mut().next = next;
    next.as_mut().prev = prev;
}

/// Follow one link of `node`: `prev` if `reversed`, otherwise `next`.
///
/// It is unsafe because `node` must be valid.
#[inline]
pub(crate) unsafe fn step<T>(node: NonNull<Node<T>>, reversed: bool) -> NonNull<Node<T>> {
    let node = node.as_ref();
    if reversed {
        node.prev
    } else {
        node.next
    }
}

// private methods
impl<T, A: Allocator> List<T, A> {
    pub(crate) fn ghost_node(&self) -> NonNull<Node<T>> {
        self.ghost
    }
    pub(crate) fn front_node(&self) -> NonNull<Node<T>> {
        // SAFETY: `ghost.next` is always valid (either `ghost` itself, or the first element
        // in the list).
        unsafe { self.ghost.as_ref().next }
    }
    pub(crate) fn back_node(&self) -> NonNull<Node<T>> {
        // SAFETY: `ghost.prev` is always valid (either `ghost` itself, or the last element
        // in the list).
        unsafe { self.ghost.as_ref().prev }
    }
    pub(crate) fn node_allocator(&self) -> &NodeAllocator<T, A> {
        &self.nodes
    }

    /// Attach a single node `node` to the list, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belongs
    /// to the list, or whether the `prev` and `next` is adjacent (only in
    /// `#[cfg(debug_assertions)]`).
    ///
    /// If the `prev` and `next` does not belong to the list, or they are not
    /// adjacent nodes, this function call will make the list ill-formed.
    pub(crate) unsafe fn attach_node(
        &mut self,
        prev: NonNull<Node<T>>,
        next: NonNull<Node<T>>,
        node: NonNull<Node<T>>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, node);
        connect(node, next);
        self.len += 1;
        #[cfg(debug_assertions)]
        {
            assert_adjacent(prev, node);
            assert_adjacent(node, next);
        }
    }

    /// Detach a single element node `node` from the list, destroy it and
    /// return its element.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the list.
    ///
    /// If the `node` does not belong to the list, or is the ghost node, this
    /// function call will make the list ill-formed.
    pub(crate) unsafe fn remove_node(&mut self, node: NonNull<Node<T>>) -> Option<T> {
        debug_assert_ne!(node, self.ghost, "Cannot remove the ghost node");
        self.len -= 1;
        let (prev, next) = (node.as_ref().prev, node.as_ref().next);
        connect(prev, next);
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        self.nodes.free_node(node)
    }

    /// Point the ghost's neighbours back at the ghost, or make the ghost link
    /// to itself if the list is empty.
    ///
    /// After the ghost links of two lists are exchanged, the neighbours still
    /// point at their former ghost, so both lists must be re-anchored.
    fn reanchor(&mut self) {
        let ghost = self.ghost;
        // SAFETY: when `len > 0`, `ghost.next` and `ghost.prev` are the first
        // and last element nodes of this list; otherwise they are overwritten
        // without being read.
        unsafe {
            if self.len == 0 {
                connect(ghost, ghost);
            } else {
                connect(ghost, self.front_node());
                connect(self.back_node(), ghost);
            }
        }
    }

    /// Exchange the elements, lengths and allocators of two lists, keeping
    /// each ghost node in place.
    fn exchange(&mut self, other: &mut Self) {
        // SAFETY: both ghost nodes are valid, and distinct since `self` and
        // `other` are distinct lists.
        unsafe {
            let (mut this, mut that) = (self.ghost, other.ghost);
            mem::swap(&mut this.as_mut().next, &mut that.as_mut().next);
            mem::swap(&mut this.as_mut().prev, &mut that.as_mut().prev);
        }
        mem::swap(&mut self.len, &mut other.len);
        mem::swap(&mut self.nodes, &mut other.nodes);
        self.reanchor();
        other.reanchor();
    }

    /// Build a copy of `self` whose nodes come from `alloc`.
    fn try_copy_in(&self, alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::try_from_iter_in(self.iter().cloned().map(Ok), alloc).map_err(alloc_only)
    }
}

impl<T> List<T> {
    /// Create an empty `List`
    ///
    /// # Examples
    /// ```
    /// use sentinel_list::List;
    /// let list: List<u32> = List::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Create a `List` of `count` clones of `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from_elem(3, &"a");
    /// assert_eq!(Vec::from_iter(list), vec!["a", "a", "a"]);
    /// ```
    pub fn from_elem(count: usize, value: &T) -> Self
    where
        T: Clone,
    {
        Self::from_elem_in(count, value, Global)
    }

    /// Create a `List` of `count` default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list: List<u8> = List::with_len(2);
    /// assert_eq!(Vec::from_iter(list), vec![0, 0]);
    /// ```
    pub fn with_len(count: usize) -> Self
    where
        T: Default,
    {
        Self::with_len_in(count, Global)
    }

    /// Create a `List` holding clones of the elements of `slice`, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from_slice(&[1, 2, 3]);
    /// assert_eq!(Vec::from_iter(list), vec![1, 2, 3]);
    /// ```
    pub fn from_slice(slice: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from_slice_in(slice, Global)
    }
}

impl<T, A: Allocator> List<T, A> {
    /// Create an empty `List` whose nodes are allocated by `alloc`.
    ///
    /// Creating an empty list never allocates from `alloc`.
    ///
    /// # Examples
    /// ```
    /// use sentinel_list::alloc::Global;
    /// use sentinel_list::List;
    ///
    /// let list: List<u32> = List::new_in(Global);
    /// assert!(list.is_empty());
    /// ```
    pub fn new_in(alloc: A) -> Self {
        Self {
            ghost: new_ghost(),
            len: 0,
            nodes: NodeAllocator::new(alloc),
            _marker: PhantomData,
        }
    }

    /// Create a `List` from a sequence of fallibly constructed elements, with
    /// nodes allocated by `alloc`.
    ///
    /// The construction is transactional: if an element fails to construct,
    /// or a node fails to allocate, every node built so far is released before
    /// the error is returned. The same holds if producing an element panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::alloc::Global;
    /// use sentinel_list::error::BuildError;
    /// use sentinel_list::List;
    ///
    /// let list = List::try_from_iter_in(["1", "2"].iter().map(|s| s.parse::<i32>()), Global);
    /// assert_eq!(Vec::from_iter(list.unwrap()), vec![1, 2]);
    ///
    /// let list = List::try_from_iter_in(["1", "x"].iter().map(|s| s.parse::<i32>()), Global);
    /// assert!(matches!(list, Err(BuildError::Element(_))));
    /// ```
    pub fn try_from_iter_in<E, I>(iter: I, alloc: A) -> Result<Self, BuildError<E>>
    where
        I: IntoIterator<Item = Result<T, E>>,
    {
        // The list under construction owns every node as soon as it is linked,
        // so an early return or an unwind releases all of them.
        let mut list = Self::new_in(alloc);
        for element in iter {
            list.try_push_back(element.map_err(BuildError::Element)?)?;
        }
        Ok(list)
    }

    /// Like [`List::from_elem`], with nodes allocated by `alloc`.
    pub fn from_elem_in(count: usize, value: &T, alloc: A) -> Self
    where
        T: Clone,
    {
        Self::try_from_elem_in(count, value, alloc)
            .unwrap_or_else(|e| handle_alloc_error(e.layout()))
    }

    /// Like [`List::from_elem_in`], but returns an error instead of aborting
    /// if a node cannot be allocated. No node is leaked on failure.
    pub fn try_from_elem_in(count: usize, value: &T, alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let elements = iter::repeat_with(|| Ok(value.clone())).take(count);
        Self::try_from_iter_in(elements, alloc).map_err(alloc_only)
    }

    /// Like [`List::with_len`], with nodes allocated by `alloc`.
    pub fn with_len_in(count: usize, alloc: A) -> Self
    where
        T: Default,
    {
        Self::try_with_len_in(count, alloc)
            .unwrap_or_else(|e| handle_alloc_error(e.layout()))
    }

    /// Like [`List::with_len_in`], but returns an error instead of aborting
    /// if a node cannot be allocated. No node is leaked on failure.
    pub fn try_with_len_in(count: usize, alloc: A) -> Result<Self, AllocError>
    where
        T: Default,
    {
        let elements = iter::repeat_with(|| Ok(T::default())).take(count);
        Self::try_from_iter_in(elements, alloc).map_err(alloc_only)
    }

    /// Like [`List::from_slice`], with nodes allocated by `alloc`.
    pub fn from_slice_in(slice: &[T], alloc: A) -> Self
    where
        T: Clone,
    {
        Self::try_from_slice_in(slice, alloc)
            .unwrap_or_else(|e| handle_alloc_error(e.layout()))
    }

    /// Like [`List::from_slice_in`], but returns an error instead of aborting
    /// if a node cannot be allocated. No node is leaked on failure.
    pub fn try_from_slice_in(slice: &[T], alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::try_from_iter_in(slice.iter().cloned().map(Ok), alloc).map_err(alloc_only)
    }

    /// Copy the list, element by element in order.
    ///
    /// The copy's allocator is chosen by the allocator's
    /// [`select_on_copy_construction`](crate::alloc::AllocPolicy::select_on_copy_construction)
    /// policy. If a node cannot be allocated, every node copied so far is
    /// released and an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from_slice(&[1, 2, 3]);
    /// let copy = list.try_clone().unwrap();
    /// assert_eq!(list, copy);
    /// ```
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let alloc = (A::policy().select_on_copy_construction)(self.allocator());
        self.try_copy_in(alloc)
    }

    /// Replace the contents of `self` with a copy of `source`.
    ///
    /// A complete copy of `source` is built first and then exchanged with the
    /// current contents, which are dropped afterwards. If the allocator policy
    /// [propagates on copy assignment] and the allocators differ, `self`
    /// adopts the allocator of `source`; otherwise it keeps its own.
    ///
    /// If a node cannot be allocated, `self` is left unchanged.
    ///
    /// [propagates on copy assignment]: crate::alloc::AllocPolicy::propagate_on_copy_assignment
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let source = List::from_slice(&[1, 2, 3]);
    /// let mut list = List::from_slice(&[4, 5]);
    /// list.try_clone_from(&source).unwrap();
    /// assert_eq!(list, source);
    /// ```
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let propagate = A::policy().propagate_on_copy_assignment;
        let alloc = if propagate && self.allocator() != source.allocator() {
            source.allocator().clone()
        } else {
            self.allocator().clone()
        };
        let mut copy = source.try_copy_in(alloc)?;
        self.exchange(&mut copy);
        Ok(())
    }

    /// Returns a reference to the allocator of the list.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.nodes.allocator()
    }

    /// Returns a copy of the allocator of the list.
    #[inline]
    pub fn get_allocator(&self) -> A {
        self.allocator().clone()
    }

    /// Returns `true` if the `List` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert!(list.is_empty());
    ///
    /// list.push_front("foo");
    /// assert!(!list.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the length of the `List`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.len(), 1);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.len(), 2);
    ///
    /// list.push_back(3);
    /// assert_eq!(list.len(), 3);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Removes all elements from the `List`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_front(2);
    /// list.push_front(1);
    /// assert_eq!(list.len(), 2);
    /// assert_eq!(list.front(), Some(&1));
    ///
    /// list.clear();
    /// assert_eq!(list.len(), 0);
    /// assert_eq!(list.front(), None);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Provides a reference to the front element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.front(), None);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.cursor_start().current()
    }

    /// Provides a mutable reference to the front element, or `None` if the list
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.front(), None);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front(), Some(&1));
    ///
    /// if let Some(x) = list.front_mut() {
    ///     *x = 5;
    /// }
    /// assert_eq!(list.front(), Some(&5));
    /// ```
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.cursor_start_mut().into_current_mut()
    }

    /// Provides a reference to the back element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.back(), None);
    ///
    /// list.push_back(1);
    /// assert_eq!(list.back(), Some(&1));
    /// ```
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.cursor_rstart().current()
    }

    /// Provides a mutable reference to the back element, or `None` if the list
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.back(), None);
    ///
    /// list.push_back(1);
    /// assert_eq!(list.back(), Some(&1));
    ///
    /// if let Some(x) = list.back_mut() {
    ///     *x = 5;
    /// }
    /// assert_eq!(list.back(), Some(&5));
    /// ```
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.cursor_rstart_mut().into_current_mut()
    }

    /// Adds an element first in the list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.front().unwrap(), &2);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front().unwrap(), &1);
    /// ```
    pub fn push_front(&mut self, elt: T) {
        if let Err(e) = self.try_push_front(elt) {
            handle_alloc_error(e.layout())
        }
    }

    /// Adds an element first in the list, or returns an error if its node
    /// cannot be allocated. On failure the list is unchanged and `elt` is
    /// dropped.
    pub fn try_push_front(&mut self, elt: T) -> Result<(), AllocError> {
        self.cursor_start_mut().try_insert(elt)
    }

    /// Adds an element first in the list, constructing it only after its node
    /// has been allocated.
    ///
    /// If `f` fails (or panics), the allocated node is released and the list
    /// is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert!(list.try_push_front_with(|| "7".parse::<i32>()).is_ok());
    /// assert!(list.try_push_front_with(|| "x".parse::<i32>()).is_err());
    /// assert_eq!(Vec::from_iter(list), vec![7]);
    /// ```
    pub fn try_push_front_with<E, F>(&mut self, f: F) -> Result<(), BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cursor_start_mut().try_insert_with(f)
    }

    /// Removes the first element and returns it, or `None` if the list is
    /// empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.pop_front(), None);
    ///
    /// list.push_front(1);
    /// list.push_front(3);
    /// assert_eq!(list.pop_front(), Some(3));
    /// assert_eq!(list.pop_front(), Some(1));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        self.cursor_start_mut().remove()
    }

    /// Appends an element to the back of a list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.back().unwrap(), &3);
    /// ```
    pub fn push_back(&mut self, elt: T) {
        if let Err(e) = self.try_push_back(elt) {
            handle_alloc_error(e.layout())
        }
    }

    /// Appends an element to the back of a list, or returns an error if its
    /// node cannot be allocated. On failure the list is unchanged and `elt` is
    /// dropped.
    pub fn try_push_back(&mut self, elt: T) -> Result<(), AllocError> {
        self.cursor_rstart_mut().try_insert(elt)
    }

    /// Appends an element to the back of a list, constructing it only after
    /// its node has been allocated.
    ///
    /// If `f` fails (or panics), the allocated node is released and the list
    /// is unchanged.
    pub fn try_push_back_with<E, F>(&mut self, f: F) -> Result<(), BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cursor_rstart_mut().try_insert_with(f)
    }

    /// Removes the last element from a list and returns it, or `None` if
    /// it is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.pop_back(), None);
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.pop_back(), Some(3));
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        self.cursor_rstart_mut().remove()
    }

    /// Provides a cursor at the first node.
    ///
    /// The cursor is pointing to the "ghost" node if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from_slice(&[1, 2, 3]);
    /// let cursor = list.cursor_start();
    /// assert_eq!(cursor.current(), Some(&1));
    /// ```
    pub fn cursor_start(&self) -> Cursor<'_, T, Forward, A> {
        Cursor::new(self, self.front_node())
    }

    /// Provides a cursor at the ghost node, past the last element.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from_slice(&[1, 2, 3]);
    /// let mut cursor = list.cursor_end();
    /// assert_eq!(cursor.current(), None);
    /// cursor.move_prev();
    /// assert_eq!(cursor.current(), Some(&3));
    /// ```
    pub fn cursor_end(&self) -> Cursor<'_, T, Forward, A> {
        Cursor::new(self, self.ghost_node())
    }

    /// Provides a reversed cursor at the last node.
    ///
    /// The cursor is pointing to the "ghost" node if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from_slice(&[1, 2, 3]);
    /// let mut cursor = list.cursor_rstart();
    /// assert_eq!(cursor.current(), Some(&3));
    /// cursor.move_next();
    /// assert_eq!(cursor.current(), Some(&2));
    /// ```
    pub fn cursor_rstart(&self) -> Cursor<'_, T, Reverse, A> {
        Cursor::new(self, self.back_node())
    }

    /// Provides a reversed cursor at the ghost node, before the first element.
    pub fn cursor_rend(&self) -> Cursor<'_, T, Reverse, A> {
        Cursor::new(self, self.ghost_node())
    }

    /// Provides a cursor with editing operations at the first node.
    ///
    /// The cursor is pointing to the "ghost" node if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from_slice(&[1, 2, 3]);
    /// let mut cursor = list.cursor_start_mut();
    ///
    /// if let Some(x) = cursor.current_mut() {
    ///     *x *= 5;
    /// }
    /// assert_eq!(cursor.current(), Some(&5));
    /// ```
    pub fn cursor_start_mut(&mut self) -> CursorMut<'_, T, Forward, A> {
        let current = self.front_node();
        CursorMut::new(self, current)
    }

    /// Provides a cursor with editing operations at the ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from_slice(&[1, 2, 3]);
    /// let mut cursor = list.cursor_end_mut();
    ///
    /// cursor.insert(4);
    /// assert_eq!(cursor.current(), None);
    /// assert_eq!(Vec::from_iter(list), vec![1, 2, 3, 4]);
    /// ```
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T, Forward, A> {
        let current = self.ghost_node();
        CursorMut::new(self, current)
    }

    /// Provides a reversed cursor with editing operations at the last node.
    ///
    /// The cursor is pointing to the "ghost" node if the list is empty.
    pub fn cursor_rstart_mut(&mut self) -> CursorMut<'_, T, Reverse, A> {
        let current = self.back_node();
        CursorMut::new(self, current)
    }

    /// Provides a reversed cursor with editing operations at the ghost node.
    pub fn cursor_rend_mut(&mut self) -> CursorMut<'_, T, Reverse, A> {
        let current = self.ghost_node();
        CursorMut::new(self, current)
    }

    /// Provides a forward iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_back(0);
    /// list.push_back(1);
    /// list.push_back(2);
    ///
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&0));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Provides a forward iterator with mutable references.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_back(0);
    /// list.push_back(1);
    /// list.push_back(2);
    ///
    /// for element in list.iter_mut() {
    ///     *element += 10;
    /// }
    ///
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&10));
    /// assert_eq!(iter.next(), Some(&11));
    /// assert_eq!(iter.next(), Some(&12));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }
}

impl<T: Debug, A: Allocator> Debug for List<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies go through [`List::try_clone`] and [`List::try_clone_from`], and
/// report allocation failure with [`handle_alloc_error`].
impl<T: Clone, A: Allocator> Clone for List<T, A> {
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|e| handle_alloc_error(e.layout()))
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(e) = self.try_clone_from(source) {
            handle_alloc_error(e.layout())
        }
    }
}

impl<T, A: Allocator> Drop for List<T, A> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the ghost node was created by `new_ghost` and is owned by
        // this list alone.
        unsafe { drop(Box::from_raw(self.ghost.as_ptr())) }
    }
}

fn new_ghost<T>() -> NonNull<Node<T>> {
    let ghost = Box::new(Node {
        next: NonNull::dangling(),
        prev: NonNull::dangling(),
        element: None,
    });
    let ghost = NonNull::from(Box::leak(ghost));
    // SAFETY: `ghost` is valid and links to itself afterwards.
    unsafe { connect(ghost, ghost) };
    ghost
}

fn alloc_only(err: BuildError<Infallible>) -> AllocError {
    match err {
        BuildError::Alloc(e) => e,
        BuildError::Element(never) => match never {},
    }
}

#[cfg(debug_assertions)]
fn assert_adjacent<T>(prev: NonNull<Node<T>>, next: NonNull<Node<T>>) {
    unsafe {
        assert_eq!(prev.as_ref().next, next);
        assert_eq!(next.as_ref().prev, prev);
    }
}

unsafe impl<T: Send, A: Allocator + Send> Send for List<T, A> {}

unsafe impl<T: Sync, A: Allocator + Sync> Sync for List<T, A> {}

// Ensure that `List` and its read-only iterators are covariant in their type parameters.
#[allow(dead_code)]
fn assert_covariance() {
    fn a<'a>(x: List<&'static str>) -> List<&'a str> {
        x
    }
    fn b<'i, 'a>(x: Iter<'i, &'static str>) -> Iter<'i, &'a str> {
        x
    }
    fn c<'a>(x: IntoIter<&'static str>) -> IntoIter<&'a str> {
        x
    }
}

#[cfg(test)]
mod tests {
    use crate::alloc::Allocator;
    use crate::error::BuildError;
    use crate::list::List;
    use crate::testing::{CountingAlloc, Fragile, PropagatingAlloc};
    use rand::Rng;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    /// Walk the list in both directions and check every link invariant.
    fn assert_well_formed<T, A: Allocator>(list: &List<T, A>) {
        let ghost = list.ghost_node();
        let mut forward = 0;
        let mut node = ghost;
        loop {
            let next = unsafe { node.as_ref().next };
            unsafe {
                assert_eq!(next.as_ref().prev, node);
            }
            node = next;
            if node == ghost {
                break;
            }
            assert!(unsafe { node.as_ref().element.is_some() });
            forward += 1;
        }
        assert_eq!(forward, list.len());

        let mut backward = 0;
        let mut node = unsafe { ghost.as_ref().prev };
        while node != ghost {
            backward += 1;
            node = unsafe { node.as_ref().prev };
        }
        assert_eq!(backward, list.len());

        assert!(unsafe { ghost.as_ref().element.is_none() });
        assert_eq!(list.is_empty(), list.front_node() == ghost);
        assert_eq!(list.is_empty(), list.back_node() == ghost);
    }

    #[test]
    fn list_create() {
        let mut list = List::<i32>::new();
        assert!(list.is_empty());
        assert_well_formed(&list);
        list.push_back(1);
        assert!(!list.is_empty());
        assert_eq!(list.pop_back(), Some(1));
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.cursor_start() == list.cursor_end());
        assert_well_formed(&list);
    }

    #[test]
    fn list_drop() {
        #[derive(Debug)]
        struct DropChecker<'a, T: Copy> {
            value: T,
            dropped: &'a RefCell<Vec<T>>,
        }
        impl<'a, T: Copy> DropChecker<'a, T> {
            fn new(value: T, dropped: &'a RefCell<Vec<T>>) -> Self {
                Self { value, dropped }
            }
        }
        impl<'a, T: Copy> Drop for DropChecker<'a, T> {
            fn drop(&mut self) {
                self.dropped.borrow_mut().push(self.value);
            }
        }
        let dropped = RefCell::new(Vec::<i32>::new());
        let alloc = CountingAlloc::new(1);
        let mut list = List::new_in(alloc.clone());
        list.push_back(DropChecker::new(1, &dropped));
        list.push_back(DropChecker::new(2, &dropped));
        list.push_back(DropChecker::new(3, &dropped));
        assert_eq!(alloc.stats().live(), 3);
        drop(list);
        assert_eq!(dropped.borrow().as_slice(), &[1, 2, 3]);
        assert_eq!(alloc.stats().allocs(), 3);
        assert_eq!(alloc.stats().live(), 0);
    }

    #[test]
    fn list_push_and_pop() {
        let mut list = List::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.pop_back(), None);

        list.push_back(1);
        assert_eq!(list.back(), Some(&1));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        list.push_front(1);
        list.push_front(2);
        list.push_back(3);
        assert_well_formed(&list);
        assert_eq!(list.back(), Some(&3));
        assert_eq!(list.front(), Some(&2));
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.pop_back(), Some(3));

        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_well_formed(&list);
    }

    #[test]
    fn list_front_and_back() {
        let mut list = List::new();
        list.push_back(1);
        list.push_back(2);
        list.push_front(0);
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![0, 1, 2]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.back(), Some(&2));
        assert_eq!(list.front(), Some(&0));

        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![0, 1]);
        assert_eq!(list.len(), 2);

        *list.front_mut().unwrap() = 10;
        *list.back_mut().unwrap() = 11;
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![10, 11]);
        assert_well_formed(&list);
    }

    #[test]
    fn list_order() {
        let mut back = List::new();
        let mut front = List::new();
        for i in 0..10 {
            back.push_back(i);
            front.push_front(i);
        }
        assert_eq!(Vec::from_iter(back.iter().copied()), Vec::from_iter(0..10));
        assert_eq!(
            Vec::from_iter(front.iter().copied()),
            Vec::from_iter((0..10).rev())
        );
        assert_eq!(
            Vec::from_iter(back.iter().rev().copied()),
            Vec::from_iter((0..10).rev())
        );
    }

    #[test]
    fn list_random_push_and_pop() {
        let mut rng = rand::thread_rng();
        let mut list = List::new();
        let mut model = VecDeque::new();
        for _ in 0..2000 {
            match rng.gen_range(0..4) {
                0 => {
                    let value: u32 = rng.gen();
                    list.push_back(value);
                    model.push_back(value);
                }
                1 => {
                    let value: u32 = rng.gen();
                    list.push_front(value);
                    model.push_front(value);
                }
                2 => assert_eq!(list.pop_back(), model.pop_back()),
                _ => assert_eq!(list.pop_front(), model.pop_front()),
            }
            assert_eq!(list.len(), model.len());
            assert_eq!(list.front(), model.front());
            assert_eq!(list.back(), model.back());
        }
        assert_well_formed(&list);
        assert!(list.iter().eq(model.iter()));
        assert!(list.iter().rev().eq(model.iter().rev()));
    }

    #[test]
    fn list_constructors() {
        let list = List::from_elem(3, &7);
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![7, 7, 7]);
        assert_well_formed(&list);

        let list: List<String> = List::with_len(2);
        assert_eq!(Vec::from_iter(list), vec![String::new(), String::new()]);

        let list = List::from_slice(&["a", "b", "c"]);
        assert_eq!(Vec::from_iter(list.iter().copied()), vec!["a", "b", "c"]);
        assert_well_formed(&list);

        let alloc = CountingAlloc::new(1);
        let empty = List::<u8, _>::from_elem_in(0, &1, alloc.clone());
        assert!(empty.is_empty());
        let empty = List::<u8, _>::with_len_in(0, alloc.clone());
        assert!(empty.is_empty());
        let empty = List::<u8, _>::from_slice_in(&[], alloc.clone());
        assert!(empty.is_empty());
        assert_well_formed(&empty);
        assert_eq!(alloc.stats().allocs(), 0);
    }

    #[test]
    fn list_constructor_alloc_failure() {
        for fail_at in 0..5 {
            let alloc = CountingAlloc::new(1);
            alloc.stats().fail_after(fail_at);
            let result = List::try_from_elem_in(5, &String::from("x"), alloc.clone());
            assert!(result.is_err());
            assert_eq!(alloc.stats().allocs(), fail_at);
            assert_eq!(alloc.stats().live(), 0);

            alloc.stats().fail_after(fail_at);
            let result = List::<u64, _>::try_with_len_in(5, alloc.clone());
            assert!(result.is_err());
            assert_eq!(alloc.stats().live(), 0);

            alloc.stats().fail_after(fail_at);
            let result = List::try_from_slice_in(&[1, 2, 3, 4, 5], alloc.clone());
            assert!(result.is_err());
            assert_eq!(alloc.stats().live(), 0);
        }

        let alloc = CountingAlloc::new(1);
        alloc.stats().fail_after(5);
        let list = List::try_from_elem_in(5, &0, alloc.clone()).unwrap();
        assert_eq!(list.len(), 5);
        drop(list);
        assert_eq!(alloc.stats().deallocs(), 5);
    }

    #[test]
    fn list_constructor_element_failure() {
        let alloc = CountingAlloc::new(1);
        let dropped = Rc::new(Cell::new(0));
        struct Counted(Rc<Cell<usize>>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let elements = (0..10).map(|i| {
            if i == 6 {
                Err("sixth element")
            } else {
                Ok(Counted(Rc::clone(&dropped)))
            }
        });
        let result = List::try_from_iter_in(elements, alloc.clone());
        assert!(matches!(result, Err(BuildError::Element("sixth element"))));
        assert_eq!(dropped.get(), 6);
        assert_eq!(alloc.stats().allocs(), 6);
        assert_eq!(alloc.stats().live(), 0);
    }

    #[test]
    fn list_constructor_panic() {
        let alloc = CountingAlloc::new(1);
        let clones_left = Rc::new(Cell::new(3));
        let value = Fragile::new(1, &clones_left);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            List::from_elem_in(5, &value, alloc.clone())
        }));
        assert!(result.is_err());
        assert_eq!(alloc.stats().allocs(), 3);
        assert_eq!(alloc.stats().live(), 0);

        clones_left.set(5);
        let list = List::from_elem_in(5, &value, alloc.clone());
        assert_eq!(list.len(), 5);
        assert!(list.iter().all(|f| f.value == 1));
    }

    #[test]
    fn list_push_failure() {
        let alloc = CountingAlloc::new(1);
        let mut list = List::from_slice_in(&[1, 2], alloc.clone());
        alloc.stats().fail_after(0);
        assert!(list.try_push_back(3).is_err());
        assert!(list.try_push_front(0).is_err());
        assert!(matches!(
            list.try_push_back_with(|| Ok::<_, ()>(3)),
            Err(BuildError::Alloc(_))
        ));
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![1, 2]);
        assert_well_formed(&list);

        alloc.stats().never_fail();
        assert_eq!(
            list.try_push_back_with(|| Err("no value")),
            Err(BuildError::Element("no value"))
        );
        assert_eq!(
            list.try_push_front_with(|| Err("no value")),
            Err(BuildError::Element("no value"))
        );
        assert_eq!(alloc.stats().allocs(), 4);
        assert_eq!(alloc.stats().live(), 2);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            list.try_push_back_with(|| -> Result<i32, ()> { panic!("element panicked") })
        }));
        assert!(result.is_err());
        assert_eq!(alloc.stats().live(), 2);

        assert_eq!(list.try_push_back_with(|| Ok::<_, ()>(3)), Ok(()));
        assert_eq!(list.try_push_front_with(|| Ok::<_, ()>(0)), Ok(()));
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![0, 1, 2, 3]);
        assert_well_formed(&list);
    }

    #[test]
    fn list_clone() {
        let list = List::from_iter(0..5);
        let mut copy = list.clone();
        assert_eq!(list, copy);
        assert_well_formed(&copy);

        copy.push_back(5);
        copy.pop_front();
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![0, 1, 2, 3, 4]);
        assert_eq!(Vec::from_iter(copy.iter().copied()), vec![1, 2, 3, 4, 5]);

        let mut list = list;
        list.push_front(-1);
        *list.back_mut().unwrap() = 99;
        assert_eq!(Vec::from_iter(copy.iter().copied()), vec![1, 2, 3, 4, 5]);

        let mut assigned = List::from([7]);
        assigned.clone_from(&list);
        list.pop_back();
        list.clear();
        assert_eq!(
            Vec::from_iter(assigned.iter().copied()),
            vec![-1, 0, 1, 2, 3, 99]
        );
        assert_well_formed(&assigned);

        let empty = List::<i32>::new();
        let copy = empty.clone();
        assert!(copy.is_empty());
        assert_well_formed(&copy);
    }

    #[test]
    fn list_clone_allocator() {
        let alloc = CountingAlloc::new(4);
        let list = List::from_slice_in(&[1, 2, 3], alloc.clone());
        let copy = list.clone();
        assert_eq!(copy.get_allocator().id(), 4);
        assert_eq!(alloc.stats().live(), 6);

        let alloc = PropagatingAlloc::new(4);
        let list = List::from_slice_in(&[1, 2, 3], alloc.clone());
        let copy = list.clone();
        assert_eq!(copy.allocator().id(), 0);
        assert_eq!(copy.allocator().stats().live(), 3);
        assert_eq!(alloc.stats().live(), 3);
    }

    #[test]
    fn list_clone_failure() {
        let alloc = CountingAlloc::new(1);
        let list = List::from_slice_in(&[1, 2, 3], alloc.clone());
        alloc.stats().fail_after(2);
        assert!(list.try_clone().is_err());
        assert_eq!(alloc.stats().live(), 3);

        alloc.stats().never_fail();
        let mut dest = List::from_slice_in(&[7, 8], alloc.clone());
        alloc.stats().fail_after(1);
        assert!(dest.try_clone_from(&list).is_err());
        assert_eq!(Vec::from_iter(dest.iter().copied()), vec![7, 8]);
        assert_well_formed(&dest);
        assert_eq!(alloc.stats().live(), 5);
    }

    #[test]
    fn list_clone_panic() {
        let alloc = CountingAlloc::new(1);
        let clones_left = Rc::new(Cell::new(5));
        let one = Fragile::new(1, &clones_left);
        let seven = Fragile::new(7, &clones_left);
        let list = List::from_elem_in(3, &one, alloc.clone());
        let mut dest = List::from_elem_in(2, &seven, alloc.clone());
        assert_eq!(alloc.stats().live(), 5);

        clones_left.set(2);
        let result = panic::catch_unwind(AssertUnwindSafe(|| list.clone()));
        assert!(result.is_err());
        assert_eq!(alloc.stats().live(), 5);

        clones_left.set(1);
        let result = panic::catch_unwind(AssertUnwindSafe(|| list.try_clone()));
        assert!(result.is_err());
        assert_eq!(alloc.stats().live(), 5);

        clones_left.set(2);
        let result = panic::catch_unwind(AssertUnwindSafe(|| dest.clone_from(&list)));
        assert!(result.is_err());
        assert_eq!(dest.len(), 2);
        assert!(dest.iter().all(|f| *f == seven));
        assert_well_formed(&dest);
        assert_eq!(alloc.stats().live(), 5);

        clones_left.set(3);
        dest.clone_from(&list);
        assert_eq!(dest, list);
        assert!(dest.iter().all(|f| *f == one));
        assert_eq!(alloc.stats().live(), 6);
    }

    #[test]
    fn list_with_len_panic() {
        thread_local! {
            static DEFAULTS_LEFT: Cell<usize> = Cell::new(0);
        }
        #[derive(Debug)]
        struct Scarce;
        impl Default for Scarce {
            fn default() -> Self {
                DEFAULTS_LEFT.with(|left| {
                    let n = left.get();
                    assert!(n > 0, "no default value left");
                    left.set(n - 1);
                });
                Scarce
            }
        }

        let alloc = CountingAlloc::new(1);
        DEFAULTS_LEFT.with(|left| left.set(2));
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            List::<Scarce, _>::with_len_in(4, alloc.clone())
        }));
        assert!(result.is_err());
        assert_eq!(alloc.stats().allocs(), 2);
        assert_eq!(alloc.stats().live(), 0);

        DEFAULTS_LEFT.with(|left| left.set(4));
        let list = List::<Scarce, _>::with_len_in(4, alloc.clone());
        assert_eq!(list.len(), 4);
        assert_well_formed(&list);
    }

    #[test]
    fn list_clone_from() {
        fn check(source: &[i32], dest: &[i32]) {
            let alloc = CountingAlloc::new(1);
            let source = List::from_slice_in(source, alloc.clone());
            let mut dest = List::from_slice_in(dest, alloc.clone());
            let ghost = dest.ghost_node();
            dest.clone_from(&source);
            assert_eq!(dest, source);
            assert_eq!(dest.ghost_node(), ghost);
            assert_well_formed(&dest);
            assert_well_formed(&source);
            assert_eq!(alloc.stats().live(), 2 * source.len());

            dest.push_back(100);
            dest.push_front(-100);
            assert_eq!(dest.len(), source.len() + 2);
            assert!(!source.iter().any(|&x| x == 100 || x == -100));
            drop(dest);
            drop(source);
            assert_eq!(alloc.stats().live(), 0);
        }
        check(&[1, 2, 3], &[4, 5]);
        check(&[1, 2, 3], &[]);
        check(&[], &[4, 5]);
        check(&[], &[]);
        check(&[1], &[2]);
    }

    #[test]
    fn list_clone_from_allocator() {
        let (a, b) = (CountingAlloc::new(1), CountingAlloc::new(2));
        let source = List::from_slice_in(&[1, 2, 3], a.clone());
        let mut dest = List::from_slice_in(&[4], b.clone());
        dest.clone_from(&source);
        assert_eq!(dest.allocator().id(), 2);
        assert_eq!(a.stats().live(), 3);
        assert_eq!(b.stats().live(), 3);

        let (a, b) = (PropagatingAlloc::new(1), PropagatingAlloc::new(2));
        let source = List::from_slice_in(&[1, 2, 3], a.clone());
        let mut dest = List::from_slice_in(&[4], b.clone());
        dest.clone_from(&source);
        assert_eq!(dest.allocator().id(), 1);
        assert_eq!(dest, source);
        assert_eq!(a.stats().live(), 6);
        assert_eq!(b.stats().live(), 0);
        drop(dest);
        assert_eq!(a.stats().live(), 3);
    }

    #[test]
    fn list_clear() {
        let alloc = CountingAlloc::new(1);
        let mut list = List::from_slice_in(&[1, 2, 3], alloc.clone());
        list.clear();
        assert!(list.is_empty());
        assert_well_formed(&list);
        assert_eq!(alloc.stats().live(), 0);
        list.push_back(4);
        assert_eq!(list.front(), Some(&4));
    }
}
