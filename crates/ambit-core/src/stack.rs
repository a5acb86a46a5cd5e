//! Immutable, structurally shared LIFO stack.

use std::fmt;
use std::sync::Arc;

/// A persistent (immutable) stack.
///
/// Pushing never mutates an existing stack: it allocates a single node that
/// points at the current head and returns a new stack value. Every stack
/// obtained earlier keeps yielding exactly the same elements, which is what
/// lets a [`ContextGuard`](crate::ContextGuard) hold a historical state
/// without copying it.
///
/// Cloning is O(1) (one reference-count increment).
pub struct PersistentStack<T> {
    head: Option<Arc<Node<T>>>,
    len: usize,
}

struct Node<T> {
    value: T,
    rest: Option<Arc<Node<T>>>,
}

impl<T> PersistentStack<T> {
    /// Create an empty stack. Does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Return a new stack with `value` on top of `self`.
    #[must_use]
    pub fn push(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(Node {
                value,
                rest: self.head.clone(),
            })),
            len: self.len.saturating_add(1),
        }
    }

    /// The most recently pushed element, if any.
    #[must_use]
    pub fn top(&self) -> Option<&T> {
        self.head.as_deref().map(|node| &node.value)
    }

    /// The stack below the top element, or `None` when empty.
    #[must_use]
    pub fn pop(&self) -> Option<Self> {
        self.head.as_deref().map(|node| Self {
            head: node.rest.clone(),
            len: self.len.saturating_sub(1),
        })
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the stack has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Iterate from top (most recently pushed) to bottom.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
            remaining: self.len,
        }
    }

    /// Whether both stacks share the same head node.
    ///
    /// Two empty stacks are considered the same.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T> Clone for PersistentStack<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

impl<T> Default for PersistentStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Unlink uniquely owned nodes iteratively so that dropping a deep stack
// cannot overflow the call stack.
impl<T> Drop for PersistentStack<T> {
    fn drop(&mut self) {
        let mut head = self.head.take();
        while let Some(node) = head {
            match Arc::try_unwrap(node) {
                Ok(mut node) => head = node.rest.take(),
                Err(_) => break,
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a PersistentStack<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for PersistentStack<T> {
    /// Push every item in order, so the last item ends up on top.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |stack, value| stack.push(value))
    }
}

/// Top-to-bottom iterator over a [`PersistentStack`].
pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.rest.as_deref();
            self.remaining = self.remaining.saturating_sub(1);
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack() {
        let stack: PersistentStack<u32> = PersistentStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.len(), 0);
        assert!(stack.top().is_none());
        assert!(stack.pop().is_none());
        assert_eq!(stack.iter().count(), 0);
    }

    #[test]
    fn test_iteration_is_lifo() {
        let stack: PersistentStack<u32> = [1, 2, 3].into_iter().collect();
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(stack.top(), Some(&3));
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_iteration_is_repeatable() {
        let stack = PersistentStack::new().push("a").push("b");
        let first: Vec<_> = stack.iter().collect();
        let second: Vec<_> = stack.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_push_leaves_prior_stack_unchanged() {
        let base = PersistentStack::new().push(1).push(2);
        let extended = base.push(3);
        let sibling = base.push(4);

        assert_eq!(base.iter().copied().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(extended.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(sibling.iter().copied().collect::<Vec<_>>(), vec![4, 2, 1]);
    }

    #[test]
    fn test_pop_shares_structure() {
        let base = PersistentStack::new().push(1);
        let extended = base.push(2);
        let popped = extended.pop().unwrap();

        assert!(popped.ptr_eq(&base));
        assert!(!extended.ptr_eq(&base));
        assert_eq!(popped.len(), 1);
    }

    #[test]
    fn test_ptr_eq_on_clones() {
        let stack = PersistentStack::new().push(String::from("x"));
        let clone = stack.clone();
        assert!(stack.ptr_eq(&clone));
        assert!(PersistentStack::<u8>::new().ptr_eq(&PersistentStack::new()));
    }

    #[test]
    fn test_size_hint_tracks_remaining() {
        let stack: PersistentStack<u8> = [1, 2, 3].into_iter().collect();
        let mut iter = stack.iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
    }

    #[test]
    fn test_deep_stack_drops_without_overflow() {
        let mut stack = PersistentStack::new();
        for i in 0..200_000u32 {
            stack = stack.push(i);
        }
        assert_eq!(stack.len(), 200_000);
        drop(stack);
    }

    #[test]
    fn test_drop_keeps_shared_tail_alive() {
        let base: PersistentStack<u32> = (0..10).collect();
        let extended = base.push(10);
        drop(extended);
        assert_eq!(base.len(), 10);
        assert_eq!(base.top(), Some(&9));
    }

    #[test]
    fn test_debug_lists_top_first() {
        let stack = PersistentStack::new().push(1).push(2);
        assert_eq!(format!("{stack:?}"), "[2, 1]");
    }
}
