//! Recency List Module
//!
//! Index-stable doubly linked list used to keep cache entries in access order.

use crate::cache::PREALLOCATED_SLOTS;

// == Recency List ==
/// Fixed-capacity arena of slots linked by prev/next indices.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Slot indices stay valid until the slot is removed, so the key index can
/// point straight at them. Freed slots are recycled through a free list, and
/// the arena never grows past the capacity given at construction. Storage
/// for very large capacities is allocated as slots are first used.
#[derive(Debug)]
pub struct RecencyList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    capacity: usize,
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates an empty list able to hold `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.min(PREALLOCATED_SLOTS)),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Push Front ==
    /// Inserts a value at the head and returns its slot.
    ///
    /// Returns the value back if the list is full; callers evict first.
    pub fn push_front(&mut self, value: T) -> Result<usize, T> {
        if self.is_full() {
            return Err(value);
        }

        let node = Node {
            value,
            prev: None,
            next: self.head,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Slot::Occupied(node);
                idx
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            self.node_mut(old_head).prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.len += 1;
        Ok(idx)
    }

    // == Remove ==
    /// Unlinks the slot and returns its value.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        if !self.contains(idx) {
            return None;
        }
        self.unlink(idx);

        let slot = std::mem::replace(&mut self.slots[idx], Slot::Vacant);
        self.free.push(idx);
        self.len -= 1;
        match slot {
            Slot::Occupied(node) => Some(node.value),
            Slot::Vacant => None,
        }
    }

    // == Move To Front ==
    /// Promotes the slot to most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if !self.contains(idx) || self.head == Some(idx) {
            return;
        }
        self.unlink(idx);

        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }
        if let Some(old_head) = old_head {
            self.node_mut(old_head).prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    /// Slot of the least recently used value.
    pub fn back(&self) -> Option<usize> {
        self.tail
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        match self.slots.get(idx) {
            Some(Slot::Occupied(node)) => Some(&node.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        match self.slots.get_mut(idx) {
            Some(Slot::Occupied(node)) => Some(&mut node.value),
            _ => None,
        }
    }

    pub fn contains(&self, idx: usize) -> bool {
        matches!(self.slots.get(idx), Some(Slot::Occupied(_)))
    }

    /// Iterates from most to least recently used, yielding `(slot, value)`.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node_mut(idx);
            (node.prev.take(), node.next.take())
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    fn node(&self, idx: usize) -> &Node<T> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant => unreachable!("linked slot {idx} is vacant"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant => unreachable!("linked slot {idx} is vacant"),
        }
    }
}

// == Iterator ==
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.list.node(idx);
        self.cursor = node.next;
        Some((idx, &node.value))
    }
}
