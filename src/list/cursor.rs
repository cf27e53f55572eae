use crate::alloc::{Allocator, Global};
use crate::error::{AllocError, BuildError};
use crate::list::{step, List, Node};
use std::fmt;
use std::fmt::Formatter;
use std::marker::PhantomData;
use std::ptr::NonNull;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Forward {}
    impl Sealed for super::Reverse {}
}

/// The direction a cursor moves in when it moves "next".
///
/// A [`Forward`] cursor follows the `next` links of the list, from the front
/// to the back. A [`Reverse`] cursor follows the `prev` links, from the back
/// to the front. Either way, the cursor reaches the ghost node after the last
/// element it visits.
pub trait Direction: sealed::Sealed {
    /// `true` if moving next follows the `prev` links.
    const REVERSED: bool;
    /// The opposite direction.
    type Opposite: Direction;
}

/// Moves from the front of the list to the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Forward;

/// Moves from the back of the list to the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reverse;

impl Direction for Forward {
    const REVERSED: bool = false;
    type Opposite = Reverse;
}

impl Direction for Reverse {
    const REVERSED: bool = true;
    type Opposite = Forward;
}

/// A cursor over a `List`.
///
/// A `Cursor` points either to an element of the list or to its "ghost" node,
/// which sits between the last and the first element. It can freely move
/// back-and-forth, and wraps around through the ghost node since the list is
/// cyclic.
///
/// The direction `D` decides which way [`move_next`](Cursor::move_next) goes.
/// [`List::cursor_start`] and [`List::cursor_end`] give forward cursors;
/// [`List::cursor_rstart`] and [`List::cursor_rend`] give reverse ones. In both
/// cases the traversal ends on the same ghost node.
///
/// `Cursor` is `Copy`, so a copy taken before moving keeps the old position.
///
/// # Examples
///
/// Here is a simple example showing how the cursors work. (The ghost node of the
/// list is denoted by `#`).
/// ```
/// use sentinel_list::List;
///
/// // Create a list: [ A B C D #]
/// let list = List::from_slice(&['A', 'B', 'C', 'D']);
///
/// // Create a cursor at start: [|A B C D #]
/// let mut cursor = list.cursor_start();
/// assert_eq!(cursor.current(), Some(&'A'));
///
/// // Move cursor forward: [ A|B C D #]
/// cursor.move_next();
/// assert_eq!(cursor.current(), Some(&'B'));
///
/// // Create a reversed cursor at the last element: [ A B C|D #]
/// let mut cursor = list.cursor_rstart();
/// assert_eq!(cursor.current(), Some(&'D'));
///
/// // Moving next goes toward the front: [ A B|C D #]
/// cursor.move_next();
/// assert_eq!(cursor.current(), Some(&'C'));
///
/// // Both directions stop at the ghost node: [ A B C D|#]
/// let mut end = list.cursor_end();
/// end.move_prev();
/// end.move_next();
/// assert_eq!(end.current(), None);
/// assert!(end == list.cursor_end());
/// ```
pub struct Cursor<'a, T: 'a, D: Direction = Forward, A: Allocator = Global> {
    pub(crate) current: NonNull<Node<T>>,
    pub(crate) list: &'a List<T, A>,
    _direction: PhantomData<D>,
}

/// Compare cursors by its position.
///
/// Only cursors belong to the same list and point to the same node
/// are considered equal.
///
/// # Examples
/// ```
/// use sentinel_list::List;
///
/// let list = List::from_slice(&[1, 2, 3]);
/// let cursor1 = list.cursor_start();
/// let mut cursor2 = cursor1;
/// // The same list, and the same position.
/// assert!(cursor1 == cursor2);
///
/// cursor2.move_next();
/// // The same list, but different positions.
/// assert!(cursor1 != cursor2);
///
/// let another_list = list.clone();
/// let cursor3 = another_list.cursor_start();
/// // Different list, different positions.
/// assert!(cursor1 != cursor3);
/// ```
impl<'a, T: 'a, D: Direction, A: Allocator> PartialEq for Cursor<'a, T, D, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.list, other.list) && self.current == other.current
    }
}

impl<'a, T: 'a, D: Direction, A: Allocator> Eq for Cursor<'a, T, D, A> {}

impl<'a, T: 'a, D: Direction, A: Allocator> Clone for Cursor<'a, T, D, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T: 'a, D: Direction, A: Allocator> Copy for Cursor<'a, T, D, A> {}

/// A cursor over a `List` with editing operations.
///
/// A `CursorMut` is like a [`Cursor`], except that it can mutate the elements,
/// and insert or remove nodes at its position. The lifetime of the references
/// it yields is tied to its own borrow, instead of just the underlying list.
///
/// # Examples
///
/// ```compile_fail
/// use sentinel_list::List;
///
/// let mut list = List::from_slice(&[1, 2, 3]);
/// let mut cursor = list.cursor_start_mut();
/// println!("{:?}", list.back());
/// println!("{:?}", cursor.current());
/// ```
pub struct CursorMut<'a, T: 'a, D: Direction = Forward, A: Allocator = Global> {
    pub(crate) current: NonNull<Node<T>>,
    pub(crate) list: &'a mut List<T, A>,
    _direction: PhantomData<D>,
}

macro_rules! impl_cursor {
    ($CURSOR:ident) => {
        // Private methods
        impl<'a, T: 'a, D: Direction, A: Allocator> $CURSOR<'a, T, D, A> {
            pub(crate) fn next_node(&self) -> NonNull<Node<T>> {
                // SAFETY: the links of `current` are always valid since it is a cyclic list.
                unsafe { step(self.current, D::REVERSED) }
            }
            pub(crate) fn prev_node(&self) -> NonNull<Node<T>> {
                // SAFETY: the links of `current` are always valid since it is a cyclic list.
                unsafe { step(self.current, !D::REVERSED) }
            }
        }

        impl<'a, T: 'a, D: Direction, A: Allocator> $CURSOR<'a, T, D, A> {
            /// Returns `true` if the cursor points to the ghost node.
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let mut list = List::new();
            /// assert!(list.cursor_start().is_ghost());
            ///
            /// list.push_back(1);
            /// assert!(!list.cursor_start().is_ghost());
            /// assert!(list.cursor_rend().is_ghost());
            /// ```
            pub fn is_ghost(&self) -> bool {
                self.current == self.list.ghost_node()
            }

            /// Returns `true` if the `List` is empty. See [`List::is_empty`].
            pub fn is_empty(&self) -> bool {
                self.list.is_empty()
            }

            /// Returns the length of the `List`. See [`List::len`].
            pub fn len(&self) -> usize {
                self.list.len()
            }

            /// Move the cursor to the next position in its direction. Moving
            /// from the last element reaches the ghost node, and moving from
            /// the ghost node wraps around to the first element.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from_slice(&[1, 2]);
            /// let mut cursor = list.cursor_start();
            ///
            /// cursor.move_next();
            /// assert_eq!(cursor.current(), Some(&2));
            /// cursor.move_next();
            /// assert_eq!(cursor.current(), None);
            /// cursor.move_next();
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            #[inline]
            pub fn move_next(&mut self) {
                self.current = self.next_node();
            }

            /// Move the cursor to the previous position in its direction,
            /// undoing [`move_next`](Self::move_next).
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from_slice(&[1, 2]);
            /// let mut cursor = list.cursor_rstart();
            /// assert_eq!(cursor.current(), Some(&2));
            ///
            /// // The reversed cursor moves back toward the end of the list.
            /// cursor.move_prev();
            /// assert_eq!(cursor.current(), None);
            /// cursor.move_prev();
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            #[inline]
            pub fn move_prev(&mut self) {
                self.current = self.prev_node();
            }
        }

        impl<'a, T: fmt::Debug + 'a, D: Direction, A: Allocator> fmt::Debug
            for $CURSOR<'a, T, D, A>
        {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($CURSOR))
                    .field("list", &self.list)
                    .field("current", &self.current())
                    .field("reversed", &D::REVERSED)
                    .finish()
            }
        }
    };
}

impl_cursor!(CursorMut);
impl_cursor!(Cursor);

impl<'a, T: 'a, D: Direction, A: Allocator> Cursor<'a, T, D, A> {
    pub(crate) fn new(list: &'a List<T, A>, current: NonNull<Node<T>>) -> Self {
        let _direction = PhantomData;
        Self {
            current,
            list,
            _direction,
        }
    }

    /// Returns a reference to the element at the cursor, or `None` if the
    /// cursor points to the ghost node.
    pub fn current(&self) -> Option<&'a T> {
        // SAFETY: `current` is a valid node of the list, which outlives `'a`.
        unsafe { (*self.current.as_ptr()).element.as_ref() }
    }

    /// Move the cursor to the next position, returning a cursor at the
    /// position it left.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from_slice(&[1, 2]);
    /// let mut cursor = list.cursor_start();
    /// let old = cursor.advance();
    /// assert_eq!(old.current(), Some(&1));
    /// assert_eq!(cursor.current(), Some(&2));
    /// ```
    pub fn advance(&mut self) -> Self {
        let old = *self;
        self.move_next();
        old
    }

    /// Move the cursor to the previous position, returning a cursor at the
    /// position it left.
    pub fn retreat(&mut self) -> Self {
        let old = *self;
        self.move_prev();
        old
    }

    /// Returns a cursor at the same position, moving in the opposite direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from_slice(&[1, 2, 3]);
    /// let mut cursor = list.cursor_start();
    /// cursor.move_next();
    ///
    /// let mut reversed = cursor.reverse();
    /// assert_eq!(reversed.current(), Some(&2));
    /// reversed.move_next();
    /// assert_eq!(reversed.current(), Some(&1));
    /// ```
    pub fn reverse(self) -> Cursor<'a, T, D::Opposite, A> {
        Cursor::new(self.list, self.current)
    }
}

impl<'a, T: 'a, D: Direction, A: Allocator> CursorMut<'a, T, D, A> {
    pub(crate) fn new(list: &'a mut List<T, A>, current: NonNull<Node<T>>) -> Self {
        let _direction = PhantomData;
        Self {
            current,
            list,
            _direction,
        }
    }

    /// Link the freshly allocated `node` right before the cursor, in the
    /// cursor's direction.
    fn attach_before(&mut self, node: NonNull<Node<T>>) {
        let (current, prev) = (self.current, self.prev_node());
        // SAFETY: `current` and `prev` are adjacent nodes of the list.
        unsafe {
            if D::REVERSED {
                self.list.attach_node(current, prev, node);
            } else {
                self.list.attach_node(prev, current, node);
            }
        }
    }
}

// Methods that does not change the linking structure of the list.
impl<'a, T: 'a, D: Direction, A: Allocator> CursorMut<'a, T, D, A> {
    /// Returns a reference to the element at the cursor, or `None` if the
    /// cursor points to the ghost node.
    pub fn current(&self) -> Option<&T> {
        // SAFETY: `current` is a valid node of the list.
        unsafe { self.current.as_ref().element.as_ref() }
    }

    /// Returns a mutable reference to the element at the cursor, or `None` if
    /// the cursor points to the ghost node.
    pub fn current_mut(&mut self) -> Option<&mut T> {
        // SAFETY: `current` is a valid node of the list, borrowed mutably
        // through `self`.
        unsafe { self.current.as_mut().element.as_mut() }
    }

    /// Like [`CursorMut::current_mut`], but the reference borrows from the list
    /// for the whole lifetime `'a`.
    pub fn into_current_mut(self) -> Option<&'a mut T> {
        // SAFETY: the cursor is consumed, so the list is only reachable through
        // the returned reference.
        unsafe { (*self.current.as_ptr()).element.as_mut() }
    }

    /// Returns a read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, D, A> {
        Cursor::new(self.list, self.current)
    }

    /// Converts into a read-only cursor at the same position.
    pub fn into_cursor(self) -> Cursor<'a, T, D, A> {
        Cursor::new(self.list, self.current)
    }

    /// Converts into a cursor at the same position, moving in the opposite
    /// direction.
    pub fn reverse(self) -> CursorMut<'a, T, D::Opposite, A> {
        CursorMut::new(self.list, self.current)
    }

    /// Temporarily views the list.
    pub fn view(&self) -> &List<T, A> {
        self.list
    }
}

// Methods that might change the linking structure of the list.
impl<'a, T: 'a, D: Direction, A: Allocator> CursorMut<'a, T, D, A> {
    /// Insert `item` before the cursor, in the cursor's direction. The cursor
    /// keeps pointing to the same node.
    ///
    /// This operation should compute in *O*(*1*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from_slice(&[1, 3]);
    /// let mut cursor = list.cursor_start_mut();
    /// cursor.move_next();
    /// cursor.insert(2);
    /// assert_eq!(cursor.current(), Some(&3));
    ///
    /// let mut cursor = cursor.reverse();
    /// cursor.insert(4);
    /// assert_eq!(Vec::from_iter(list), vec![1, 2, 3, 4]);
    /// ```
    pub fn insert(&mut self, item: T) {
        if let Err(e) = self.try_insert(item) {
            std::alloc::handle_alloc_error(e.layout())
        }
    }

    /// Like [`CursorMut::insert`], but returns an error if the node cannot be
    /// allocated. On failure the list is unchanged and `item` is dropped.
    pub fn try_insert(&mut self, item: T) -> Result<(), AllocError> {
        let node = self.list.node_allocator().new_node(item)?;
        self.attach_before(node);
        Ok(())
    }

    /// Like [`CursorMut::try_insert`], but constructs the element with `f`
    /// after its node is allocated.
    ///
    /// If `f` fails or panics, the node is released and the list is unchanged.
    pub fn try_insert_with<E, F>(&mut self, f: F) -> Result<(), BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let node = {
            let uninit = self.list.node_allocator().allocate_node()?;
            uninit.init(f().map_err(BuildError::Element)?)
        };
        self.attach_before(node);
        Ok(())
    }

    /// Remove the element at the cursor and return it, moving the cursor to
    /// the next position. Returns `None` if the cursor points to the ghost
    /// node.
    ///
    /// This operation should compute in *O*(*1*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from_slice(&[1, 2, 3]);
    /// let mut cursor = list.cursor_rstart_mut();
    /// assert_eq!(cursor.remove(), Some(3));
    /// assert_eq!(cursor.current(), Some(&2));
    /// assert_eq!(Vec::from_iter(list), vec![1, 2]);
    /// ```
    pub fn remove(&mut self) -> Option<T> {
        if self.is_ghost() {
            return None;
        }
        let next = self.next_node();
        let node = std::mem::replace(&mut self.current, next);
        // SAFETY: `node` is a valid non-ghost node in the list, so it is safe.
        unsafe { self.list.remove_node(node) }
    }
}

unsafe impl<T: Sync, D: Direction, A: Allocator + Sync> Send for Cursor<'_, T, D, A> {}

unsafe impl<T: Sync, D: Direction, A: Allocator + Sync> Sync for Cursor<'_, T, D, A> {}

unsafe impl<T: Send, D: Direction, A: Allocator + Send> Send for CursorMut<'_, T, D, A> {}

unsafe impl<T: Sync, D: Direction, A: Allocator + Sync> Sync for CursorMut<'_, T, D, A> {}
