//! This crate provides a doubly-linked list with owned nodes, anchored by a
//! "ghost" node that marks both ends of the sequence.
//!
//! The [`List`] allows inserting and removing elements at either end, or at
//! any cursor position, in constant time. Every node holding an element is
//! obtained from the list's [`Allocator`], which defaults to [`Global`].
//!
//! Here is a quick example showing how the list works.
//!
//! ```
//! use sentinel_list::List;
//!
//! let mut list = List::new();
//! list.push_back(1);
//! list.push_back(2);
//! list.push_front(0);
//! assert_eq!(list.front(), Some(&0));
//! assert_eq!(list.back(), Some(&2));
//!
//! let mut cursor = list.cursor_start_mut();
//! cursor.move_next();
//! cursor.insert(5); // insert 5 before 1
//! assert_eq!(cursor.current(), Some(&1));
//! assert_eq!(cursor.view(), &List::from([0, 5, 1, 2]));
//!
//! assert_eq!(list.pop_back(), Some(2));
//! assert_eq!(list.len(), 3);
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the list is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                       Ghost node    │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢     Node 2, 3, ...     ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        ├───────────┤
//! │  ║ Some(T)   ║           ║ Some(T)   ║                        ┊   None    ┊
//! │  ╚═══════════╝           ╚═══════════╝                        └╌╌╌╌╌╌╌╌╌╌╌┘
//! │      Node 0                  Node 1                               ↑   ↑
//! └───────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                           │
//! ║   ghost   ║ ──────────────────────────────────────────────────────────┘
//! ╟───────────╢
//! ║    len    ║
//! ╟───────────╢
//! ║ allocator ║
//! ╚═══════════╝
//!     List
//! ```
//! The `List` contains:
//! - a pointer `ghost` that points to the ghost node;
//! - the number of elements `len`;
//! - the allocator used for the element nodes.
//!
//! An element node holds the `next` and `prev` links and its payload. The
//! ghost node has the same shape but holds no payload, so reading "through"
//! it yields `None`.
//!
//! In an empty list, both links of the ghost node point to itself. Otherwise
//! `ghost.next` is the first element and `ghost.prev` is the last one. The
//! ghost node lives as long as the list and keeps its address, also across
//! [`Clone::clone_from`], so a cursor at the end of a list stays meaningful.
//!
//! # Iteration
//!
//! Iterating over a list is by the [`Iter`] and [`IterMut`] iterators. These
//! are double-ended iterators and iterate the list like an array (fused and
//! non-cyclic).
//!
//! ```
//! use sentinel_list::List;
//!
//! let mut list = List::from([1, 2, 3]);
//! let mut iter = list.iter();
//! assert_eq!(iter.next(), Some(&1));
//! assert_eq!(iter.next_back(), Some(&3));
//! assert_eq!(iter.next(), Some(&2));
//! assert_eq!(iter.next(), None);
//!
//! list.iter_mut().for_each(|item| *item *= 2);
//! assert_eq!(Vec::from_iter(list), vec![2, 4, 6]);
//! ```
//!
//! # Cursors
//!
//! The cursors [`Cursor`] and [`CursorMut`] point either to an element or to
//! the ghost node. A cursor is [`Forward`] or [`Reverse`]: a reverse cursor
//! walks from the back to the front, and both reach the same ghost node at
//! the end of their walk.
//!
//! | position          | forward                     | reverse                       |
//! |-------------------|-----------------------------|-------------------------------|
//! | first visited     | [`cursor_start`]            | [`cursor_rstart`]             |
//! | past the last     | [`cursor_end`]              | [`cursor_rend`]               |
//! | mutable variants  | [`cursor_start_mut`], ...   | [`cursor_rstart_mut`], ...    |
//!
//! ```
//! use sentinel_list::List;
//!
//! let list = List::from([1, 2, 3]);
//!
//! let mut cursor = list.cursor_rstart();
//! let mut seen = Vec::new();
//! while let Some(x) = cursor.current() {
//!     seen.push(*x);
//!     cursor.move_next();
//! }
//! assert_eq!(seen, vec![3, 2, 1]);
//! assert!(cursor.is_ghost());
//! assert!(cursor == list.cursor_rend());
//! ```
//!
//! # Fallible allocation
//!
//! Every operation that allocates has a `try_` variant returning
//! [`AllocError`], or [`BuildError`] when the elements themselves are built by
//! a fallible closure or iterator. A failed operation leaves the list as it was.
//!
//! [`Allocator`]: crate::alloc::Allocator
//! [`Global`]: crate::alloc::Global
//! [`AllocError`]: crate::error::AllocError
//! [`BuildError`]: crate::error::BuildError
//! [`Cursor`]: crate::list::cursor::Cursor
//! [`CursorMut`]: crate::list::cursor::CursorMut
//! [`Forward`]: crate::list::cursor::Forward
//! [`Reverse`]: crate::list::cursor::Reverse
//! [`cursor_start`]: crate::List::cursor_start
//! [`cursor_end`]: crate::List::cursor_end
//! [`cursor_rstart`]: crate::List::cursor_rstart
//! [`cursor_rend`]: crate::List::cursor_rend
//! [`cursor_start_mut`]: crate::List::cursor_start_mut
//! [`cursor_rstart_mut`]: crate::List::cursor_rstart_mut

#[doc(inline)]
pub use list::iterator::{IntoIter, Iter, IterMut};
#[doc(inline)]
pub use list::List;

pub mod alloc;
pub mod error;
pub mod list;

#[cfg(test)]
mod testing;
