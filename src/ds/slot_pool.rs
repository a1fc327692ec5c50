//! Fixed-size slot pool shared by the index-linked segment lists.
//!
//! Every slot is allocated once, at construction, and is recycled for the
//! lifetime of the pool. A slot carries its payload (`key`, `value`), its two
//! list links, and an owner tag naming the list that currently holds it.
//!
//! ```text
//!   entries: Vec<Entry<K, V>>
//!   ┌────────┬──────────────────────────────────────────────────────────┐
//!   │ SlotId │ Entry { key, value, prev, next, owner }                  │
//!   ├────────┼──────────────────────────────────────────────────────────┤
//!   │   0    │ { Some(k0), Some(v0), None,    Some(2), Probationary }   │
//!   │   1    │ { None,     None,     None,    None,    Free }           │
//!   │   2    │ { Some(k2), Some(v2), Some(0), None,    Probationary }   │
//!   └────────┴──────────────────────────────────────────────────────────┘
//! ```
//!
//! A `SlotId` identifies a slot, not a logical cache entry: once a slot is
//! cleared and reused, the same id refers to a different key.

use std::fmt;

/// Index of a slot inside a [`SlotPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Returns the raw slot index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Names one of the three lists that partition the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListId {
    /// Unused slots waiting to be handed out.
    Free,
    /// Newly admitted entries without a confirmed re-access.
    Probationary,
    /// Entries promoted by at least one lookup hit.
    Protected,
}

impl ListId {
    /// Lower-case list name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ListId::Free => "free",
            ListId::Probationary => "probationary",
            ListId::Protected => "protected",
        }
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pool slot.
///
/// `key` and `value` are `None` while the slot sits in the free list.
#[derive(Debug)]
pub struct Entry<K, V> {
    pub(crate) key: Option<K>,
    pub(crate) value: Option<V>,
    pub(crate) prev: Option<SlotId>,
    pub(crate) next: Option<SlotId>,
    pub(crate) owner: Option<ListId>,
}

impl<K, V> Entry<K, V> {
    fn vacant() -> Self {
        Self {
            key: None,
            value: None,
            prev: None,
            next: None,
            owner: None,
        }
    }

    /// Key stored in the slot, if occupied.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Value stored in the slot, if occupied.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Previous slot in the owning list.
    pub fn prev(&self) -> Option<SlotId> {
        self.prev
    }

    /// Next slot in the owning list.
    pub fn next(&self) -> Option<SlotId> {
        self.next
    }

    /// List currently holding this slot; `None` only while detached.
    pub fn owner(&self) -> Option<ListId> {
        self.owner
    }

    /// Returns `true` if both key and value are cleared.
    pub fn is_vacant(&self) -> bool {
        self.key.is_none() && self.value.is_none()
    }

    #[inline]
    pub(crate) fn unlink(&mut self) {
        self.prev = None;
        self.next = None;
        self.owner = None;
    }
}

/// Pre-sized array of [`Entry`] slots addressed by [`SlotId`].
///
/// The pool never grows or shrinks after construction.
#[derive(Debug)]
pub struct SlotPool<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> SlotPool<K, V> {
    /// Creates a pool of `capacity` vacant, unlinked slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, Entry::vacant);
        Self { entries }
    }

    /// Number of slots in the pool.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over every slot id in index order.
    pub fn ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        (0..self.entries.len()).map(SlotId)
    }

    /// Checked access; `None` if `id` is out of range.
    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&Entry<K, V>> {
        self.entries.get(id.0)
    }

    #[inline]
    pub(crate) fn entry(&self, id: SlotId) -> &Entry<K, V> {
        &self.entries[id.0]
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, id: SlotId) -> &mut Entry<K, V> {
        &mut self.entries[id.0]
    }

    /// Key stored at `id`.
    #[inline]
    pub fn key(&self, id: SlotId) -> Option<&K> {
        self.entries.get(id.0).and_then(|e| e.key.as_ref())
    }

    /// Value stored at `id`.
    #[inline]
    pub fn value(&self, id: SlotId) -> Option<&V> {
        self.entries.get(id.0).and_then(|e| e.value.as_ref())
    }

    /// Mutable value stored at `id`.
    #[inline]
    pub fn value_mut(&mut self, id: SlotId) -> Option<&mut V> {
        self.entries.get_mut(id.0).and_then(|e| e.value.as_mut())
    }

    /// Owner tag of `id`.
    #[inline]
    pub fn owner(&self, id: SlotId) -> Option<ListId> {
        self.entries.get(id.0).and_then(|e| e.owner)
    }

    /// Stores a key/value pair in a vacant slot.
    #[inline]
    pub(crate) fn fill(&mut self, id: SlotId, key: K, value: V) {
        let entry = self.entry_mut(id);
        debug_assert!(entry.is_vacant(), "filling occupied slot {id}");
        entry.key = Some(key);
        entry.value = Some(value);
    }

    /// Replaces the value of an occupied slot, returning the old one.
    #[inline]
    pub(crate) fn replace_value(&mut self, id: SlotId, value: V) -> Option<V> {
        self.entry_mut(id).value.replace(value)
    }

    /// Clears a slot's payload and hands it back to the caller.
    ///
    /// Links and owner tag are untouched; list operations own those.
    #[inline]
    pub(crate) fn take(&mut self, id: SlotId) -> (Option<K>, Option<V>) {
        let entry = self.entry_mut(id);
        (entry.key.take(), entry.value.take())
    }
}
