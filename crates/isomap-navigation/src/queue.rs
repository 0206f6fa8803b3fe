//! Binary min-heap with a caller-supplied comparator.
//!
//! Items that compare equal leave the queue in insertion order.

use std::cmp::Ordering;

struct Entry<T> {
    item: T,
    seq: u64,
}

/// A min-priority queue ordered by `compare`, ties broken first-in first-out.
///
/// Indices accepted by [`remove`](Self::remove) and returned by
/// [`position`](Self::position) refer to the internal heap layout and are
/// only valid until the next mutation.
pub struct PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    heap: Vec<Entry<T>>,
    compare: F,
    next_seq: u64,
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty queue; `compare` returning `Less` means higher priority.
    pub fn new(compare: F) -> Self {
        PriorityQueue { heap: Vec::new(), compare, next_seq: 0 }
    }

    /// Creates an empty queue with room for `capacity` items.
    pub fn with_capacity(capacity: usize, compare: F) -> Self {
        PriorityQueue { heap: Vec::with_capacity(capacity), compare, next_seq: 0 }
    }

    /// Inserts an item and returns the new length.
    pub fn push(&mut self, item: T) -> usize {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { item, seq });
        let last = self.heap.len() - 1;
        self.sift_up(last);
        self.heap.len()
    }

    /// The minimum item, if any.
    pub fn peek(&self) -> Option<&T> {
        self.heap.first().map(|e| &e.item)
    }

    /// Removes and returns the minimum item.
    pub fn pop(&mut self) -> Option<T> {
        self.remove(0)
    }

    /// Removes the item at heap index `index`.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.heap.len() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(index, last);
        let entry = self.heap.pop()?;
        if index < self.heap.len() {
            self.sift_down(index);
            self.sift_up(index);
        }
        Some(entry.item)
    }

    /// Heap index of the first item matching `pred`.
    pub fn position<P>(&self, mut pred: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.heap.iter().position(|e| pred(&e.item))
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops every queued item.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Iterates items in heap order (not sorted).
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.heap.iter().map(|e| &e.item)
    }

    fn less(&self, a: usize, b: usize) -> bool {
        let (a, b) = (&self.heap[a], &self.heap[b]);
        (self.compare)(&a.item, &b.item).then(a.seq.cmp(&b.seq)) == Ordering::Less
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.less(index, parent) {
                break;
            }
            self.heap.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.heap.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T, F: Fn(&T, &T) -> Ordering>(queue: &mut PriorityQueue<T, F>) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(item) = queue.pop() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_pops_in_priority_order() {
        let mut queue = PriorityQueue::new(|a: &i32, b: &i32| a.cmp(b));
        for v in [5, 3, 9, 1, 7, 3, 0] {
            queue.push(v);
        }
        assert_eq!(queue.peek(), Some(&0));
        assert_eq!(drain(&mut queue), vec![0, 1, 3, 3, 5, 7, 9]);
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_push_returns_length() {
        let mut queue = PriorityQueue::new(|a: &u8, b: &u8| a.cmp(b));
        assert_eq!(queue.push(4), 1);
        assert_eq!(queue.push(2), 2);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_equal_priorities_are_fifo() {
        let mut queue = PriorityQueue::new(|a: &(u32, char), b: &(u32, char)| a.0.cmp(&b.0));
        for item in [(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd'), (1, 'e'), (0, 'f')] {
            queue.push(item);
        }
        let order: Vec<char> = drain(&mut queue).into_iter().map(|(_, c)| c).collect();
        assert_eq!(order, vec!['b', 'd', 'f', 'a', 'c', 'e']);
    }

    #[test]
    fn test_remove_arbitrary_index() {
        let mut queue = PriorityQueue::new(|a: &i32, b: &i32| a.cmp(b));
        for v in [10, 4, 8, 2, 6, 12, 1] {
            queue.push(v);
        }
        let index = queue.position(|v| *v == 8).unwrap();
        assert_eq!(queue.remove(index), Some(8));
        assert_eq!(queue.position(|v| *v == 8), None);
        assert_eq!(queue.remove(100), None);
        assert_eq!(drain(&mut queue), vec![1, 2, 4, 6, 10, 12]);
    }

    #[test]
    fn test_remove_keeps_heap_valid() {
        let mut queue = PriorityQueue::new(|a: &i32, b: &i32| b.cmp(a));
        for v in 0..50 {
            queue.push((v * 37) % 50);
        }
        for target in [0, 17, 49, 25, 3] {
            let index = queue.position(|v| *v == target).unwrap();
            assert_eq!(queue.remove(index), Some(target));
        }
        let out = drain(&mut queue);
        assert_eq!(out.len(), 45);
        assert!(out.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_clear_and_iter() {
        let mut queue = PriorityQueue::with_capacity(4, |a: &i32, b: &i32| a.cmp(b));
        queue.push(3);
        queue.push(1);
        queue.push(2);
        let mut items: Vec<i32> = queue.iter().copied().collect();
        items.sort();
        assert_eq!(items, vec![1, 2, 3]);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.peek(), None);
    }
}
