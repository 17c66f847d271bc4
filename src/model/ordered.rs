use std::fmt::Debug;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Something with a stable identity inside an [`OrderedCollection`].
pub trait Identified {
    type Id: PartialEq + Clone + Debug;

    fn id(&self) -> &Self::Id;
}

impl Identified for PathBuf {
    type Id = PathBuf;

    fn id(&self) -> &PathBuf {
        self
    }
}

impl Identified for String {
    type Id = String;

    fn id(&self) -> &String {
        self
    }
}

/// Error type for strict reorders
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("new order has {got} entries, expected {expected}")]
    WrongLength { expected: usize, got: usize },
    #[error("unknown entry in new order: {0}")]
    Unknown(String),
    #[error("duplicate entry in new order: {0}")]
    Duplicate(String),
}

/// An ordered, deduplicated sequence with an optional "current" selection.
///
/// The selection always points at a valid index, or is `None` when nothing is
/// selected. Every mutation repairs it: the selection follows its item when
/// the item moves, and is clamped into bounds when the item disappears.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedCollection<T> {
    items: Vec<T>,
    current: Option<usize>,
}

impl<T> Default for OrderedCollection<T> {
    fn default() -> Self {
        OrderedCollection {
            items: Vec::new(),
            current: None,
        }
    }
}

impl<T: Identified> OrderedCollection<T> {
    /// Build from a list, keeping the first occurrence of each identity.
    /// The first item (if any) becomes current.
    pub fn from_items(items: Vec<T>) -> Self {
        let mut deduped: Vec<T> = Vec::with_capacity(items.len());
        for item in items {
            if !deduped.iter().any(|d| d.id() == item.id()) {
                deduped.push(item);
            }
        }
        let current = if deduped.is_empty() { None } else { Some(0) };
        OrderedCollection {
            items: deduped,
            current,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn ids(&self) -> Vec<T::Id> {
        self.items.iter().map(|i| i.id().clone()).collect()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|i| i.id() == id)
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.items.iter_mut().find(|i| i.id() == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&T> {
        self.current.and_then(|i| self.items.get(i))
    }

    /// Select the item with this identity. Returns false if absent.
    pub fn select(&mut self, id: &T::Id) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.current = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Advance the selection, wrapping past the end.
    pub fn select_next(&mut self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        };
        self.current = Some(next);
        self.items.get(next)
    }

    /// Step the selection back, wrapping past the start.
    pub fn select_prev(&mut self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len();
        let prev = match self.current {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        };
        self.current = Some(prev);
        self.items.get(prev)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Append an item unless its identity is already present.
    /// The first item appended to an empty collection becomes current.
    pub fn append(&mut self, item: T) -> bool {
        if self.contains(item.id()) {
            return false;
        }
        self.items.push(item);
        if self.current.is_none() {
            self.current = Some(0);
        }
        true
    }

    /// Remove the item with this identity. No-op if absent.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let idx = self.position(id)?;
        let removed = self.items.remove(idx);
        self.current = match self.current {
            _ if self.items.is_empty() => None,
            Some(cur) if cur > idx => Some(cur - 1),
            Some(cur) => Some(cur.min(self.items.len() - 1)),
            None => None,
        };
        Some(removed)
    }

    /// Rebuild the order from the sequence a drag-and-drop produced.
    ///
    /// Identities are taken first-seen (the reorder signal may repeat an
    /// entry), identities missing from `new_order` are dropped and unknown
    /// identities are ignored. The selection follows the previously current
    /// item; if that item was dropped it falls back to the first item.
    pub fn reorder(&mut self, new_order: &[T::Id]) {
        let selected = self.current().map(|i| i.id().clone());
        let mut old = std::mem::take(&mut self.items);
        for id in new_order {
            if self.items.iter().any(|i| i.id() == id) {
                continue;
            }
            if let Some(pos) = old.iter().position(|i| i.id() == id) {
                self.items.push(old.remove(pos));
            }
        }
        self.relocate_selection(selected);
    }

    /// Replace the order with an exact permutation of the current identities.
    /// Anything else is rejected and the collection is left unchanged.
    pub fn reorder_exact(&mut self, new_order: &[T::Id]) -> Result<(), OrderError> {
        if new_order.len() != self.items.len() {
            return Err(OrderError::WrongLength {
                expected: self.items.len(),
                got: new_order.len(),
            });
        }
        for (i, id) in new_order.iter().enumerate() {
            if !self.contains(id) {
                return Err(OrderError::Unknown(format!("{:?}", id)));
            }
            if new_order[..i].contains(id) {
                return Err(OrderError::Duplicate(format!("{:?}", id)));
            }
        }
        self.reorder(new_order);
        Ok(())
    }

    /// Move an item `delta` places (negative = towards the front).
    /// Returns the new index, or None if the id is absent or the move would
    /// leave the bounds of the collection.
    pub fn shift(&mut self, id: &T::Id, delta: isize) -> Option<usize> {
        let idx = self.position(id)?;
        let target = idx.checked_add_signed(delta)?;
        if target >= self.items.len() {
            return None;
        }
        let selected = self.current().map(|i| i.id().clone());
        let item = self.items.remove(idx);
        self.items.insert(target, item);
        self.relocate_selection(selected);
        Some(target)
    }

    fn relocate_selection(&mut self, selected: Option<T::Id>) {
        self.current = match selected.and_then(|id| self.position(&id)) {
            Some(idx) => Some(idx),
            None if self.items.is_empty() => None,
            None => Some(0),
        };
    }
}

impl<'a, T> IntoIterator for &'a OrderedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// The persisted shape is the bare sequence; the selection is stored elsewhere.
impl<T: Serialize> Serialize for OrderedCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Identified + DeserializeOwned> Deserialize<'de> for OrderedCollection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(OrderedCollection::from_items(items))
    }
}
