use std::alloc::Layout;
use thiserror::Error;

/// The allocator could not provide memory for a list node.
///
/// Returned by every fallible operation that allocates, such as
/// [`List::try_push_back`](crate::List::try_push_back) or
/// [`List::try_clone`](crate::List::try_clone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("memory allocation of {} bytes failed", .layout.size())]
pub struct AllocError {
    layout: Layout,
}

impl AllocError {
    /// Reports a failed request for `layout`.
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// The layout of the allocation that failed.
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

/// Failure of an operation that both allocates nodes and constructs the
/// elements stored in them.
///
/// Whichever way the operation fails, the nodes it already acquired are
/// released before this error reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError<E> {
    #[error(transparent)]
    Alloc(#[from] AllocError),
    #[error("element construction failed: {0}")]
    Element(E),
}

impl<E> BuildError<E> {
    /// Returns the element error, or `None` if the allocation failed.
    pub fn into_element(self) -> Option<E> {
        match self {
            BuildError::Alloc(_) => None,
            BuildError::Element(e) => Some(e),
        }
    }
}
