//! Doubly linked list over [`SlotPool`] slots, linked by [`SlotId`].
//!
//! The list stores no entries itself: `head`, `tail` and `len` are its whole
//! state, and the links live in the pool slots. Several lists can therefore
//! partition one pool, with each slot's owner tag recording which list holds
//! it.
//!
//! ## Architecture
//!
//! ```text
//!   IndexedList { id: Protected, head: 4, tail: 1, len: 3 }
//!
//!   head ─► [#4] ◄──► [#0] ◄──► [#1] ◄── tail
//!            │         │         │
//!            └─────────┴─────────┴── owner = Protected
//! ```
//!
//! ## Operations
//! - `push_front(id)`: O(1), slot must be detached
//! - `pop_front` / `pop_back`: O(1), returns the detached slot
//! - `remove(id)`: O(1), only if the slot's owner tag names this list
//!
//! A detached slot has no links and no owner; callers must immediately hand
//! it to another list.

use crate::ds::slot_pool::{ListId, SlotId, SlotPool};

/// Index-linked list view over a shared [`SlotPool`].
#[derive(Debug, Clone)]
pub struct IndexedList {
    id: ListId,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl IndexedList {
    /// Creates an empty list tagged `id`.
    pub fn new(id: ListId) -> Self {
        Self {
            id,
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Tag written into the owner field of member slots.
    #[inline]
    pub fn id(&self) -> ListId {
        self.id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently attached slot.
    #[inline]
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Least recently attached slot.
    #[inline]
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Attaches a detached slot at the head.
    pub fn push_front<K, V>(&mut self, pool: &mut SlotPool<K, V>, id: SlotId) {
        debug_assert!(
            pool.entry(id).owner.is_none(),
            "slot {id} pushed onto {} while still linked",
            self.id
        );

        let old_head = self.head;
        {
            let entry = pool.entry_mut(id);
            entry.prev = None;
            entry.next = old_head;
            entry.owner = Some(self.id);
        }

        match old_head {
            Some(head) => pool.entry_mut(head).prev = Some(id),
            None => self.tail = Some(id),
        }

        self.head = Some(id);
        self.len += 1;
    }

    /// Detaches and returns the head slot.
    pub fn pop_front<K, V>(&mut self, pool: &mut SlotPool<K, V>) -> Option<SlotId> {
        let head = self.head?;
        let next = pool.entry(head).next;

        self.head = next;
        match next {
            Some(n) => pool.entry_mut(n).prev = None,
            None => self.tail = None,
        }

        pool.entry_mut(head).unlink();
        self.len -= 1;
        Some(head)
    }

    /// Detaches and returns the tail slot.
    pub fn pop_back<K, V>(&mut self, pool: &mut SlotPool<K, V>) -> Option<SlotId> {
        let tail = self.tail?;
        let prev = pool.entry(tail).prev;

        self.tail = prev;
        match prev {
            Some(p) => pool.entry_mut(p).next = None,
            None => self.head = None,
        }

        pool.entry_mut(tail).unlink();
        self.len -= 1;
        Some(tail)
    }

    /// Detaches `id` if this list owns it; returns `false` otherwise.
    pub fn remove<K, V>(&mut self, pool: &mut SlotPool<K, V>, id: SlotId) -> bool {
        if pool.owner(id) != Some(self.id) {
            return false;
        }

        if self.head == Some(id) {
            self.pop_front(pool);
        } else if self.tail == Some(id) {
            self.pop_back(pool);
        } else {
            let (prev, next) = {
                let entry = pool.entry(id);
                (entry.prev, entry.next)
            };
            // Interior slot: both neighbors exist.
            if let Some(p) = prev {
                pool.entry_mut(p).next = next;
            }
            if let Some(n) = next {
                pool.entry_mut(n).prev = prev;
            }
            pool.entry_mut(id).unlink();
            self.len -= 1;
        }

        true
    }

    /// Detaches `id` and re-attaches it at the head.
    ///
    /// Returns `false` without touching anything if the list does not own `id`.
    pub fn move_to_front<K, V>(&mut self, pool: &mut SlotPool<K, V>, id: SlotId) -> bool {
        if self.head == Some(id) {
            return pool.owner(id) == Some(self.id);
        }
        if !self.remove(pool, id) {
            return false;
        }
        self.push_front(pool, id);
        true
    }

    /// Iterates slot ids from head to tail.
    pub fn iter<'a, K, V>(&self, pool: &'a SlotPool<K, V>) -> IndexedListIter<'a, K, V> {
        IndexedListIter {
            pool,
            current: self.head,
            remaining: self.len,
            forward: true,
        }
    }

    /// Iterates slot ids from tail to head.
    pub fn iter_rev<'a, K, V>(&self, pool: &'a SlotPool<K, V>) -> IndexedListIter<'a, K, V> {
        IndexedListIter {
            pool,
            current: self.tail,
            remaining: self.len,
            forward: false,
        }
    }

    /// Walks the list and appends a message for every structural violation.
    ///
    /// Checks back links, owner tags, the tail pointer, the tracked length,
    /// and terminates on cycles. Never panics, even on corrupt links.
    pub fn collect_violations<K, V>(&self, pool: &SlotPool<K, V>, out: &mut Vec<String>) {
        let name = self.id;

        if self.head.is_none() != self.tail.is_none() {
            out.push(format!(
                "{name}: head {:?} and tail {:?} disagree on emptiness",
                self.head, self.tail
            ));
        }
        if let Some(head) = self.head {
            if pool.get(head).and_then(|e| e.prev).is_some() {
                out.push(format!("{name}: head {head} has a prev link"));
            }
        }

        let mut current = self.head;
        let mut last = None;
        let mut walked = 0usize;

        while let Some(id) = current {
            let Some(entry) = pool.get(id) else {
                out.push(format!("{name}: link to out-of-range slot {id}"));
                return;
            };

            if let Some(prev) = entry.prev {
                if pool.get(prev).and_then(|e| e.next) != Some(id) {
                    out.push(format!("{name}: prev link failure at {id}"));
                }
            }
            if let Some(next) = entry.next {
                if pool.get(next).and_then(|e| e.prev) != Some(id) {
                    out.push(format!("{name}: next link failure at {id}"));
                }
            }
            match entry.owner {
                None => out.push(format!("{name}: slot {id} has no owner tag")),
                Some(owner) if owner != self.id => {
                    out.push(format!("{name}: slot {id} is tagged {owner}"));
                },
                Some(_) => {},
            }

            walked += 1;
            if walked > pool.capacity() {
                out.push(format!("{name}: cycle detected after {walked} nodes"));
                return;
            }

            last = Some(id);
            current = entry.next;
        }

        if self.tail != last {
            out.push(format!(
                "{name}: tail reference mismatch (tail {:?}, walk ended at {:?})",
                self.tail, last
            ));
        }
        if walked != self.len {
            out.push(format!(
                "{name}: length mismatch (tracked {}, walked {walked})",
                self.len
            ));
        }
    }
}

/// Iterator over the slot ids of an [`IndexedList`].
pub struct IndexedListIter<'a, K, V> {
    pool: &'a SlotPool<K, V>,
    current: Option<SlotId>,
    remaining: usize,
    forward: bool,
}

impl<'a, K, V> Iterator for IndexedListIter<'a, K, V> {
    type Item = SlotId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.current?;
        let entry = self.pool.get(id)?;
        self.current = if self.forward { entry.next } else { entry.prev };
        self.remaining -= 1;
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
