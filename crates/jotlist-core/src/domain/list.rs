//! The per-user working list of item ids
//!
//! An ordered sequence of unique item ids, persisted as a single durable
//! record. The list has a configured soft cap: exceeding it is surfaced
//! as a warning and bounds how many items are included in a sync batch,
//! but the list itself is never truncated.

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::id::ItemId;

/// Ordering imposed on the working list after reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListOrder {
    /// Total order on the raw id string - stable across devices because
    /// every client derives the same order from the same ids
    ById,
    /// Keep arrival order: surviving ids first, additions appended
    Insertion,
}

impl Default for ListOrder {
    fn default() -> Self {
        ListOrder::ById
    }
}

/// Ordered, duplicate-free sequence of item ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkingList(Vec<ItemId>);

impl WorkingList {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a list from ids, rejecting duplicates
    ///
    /// # Errors
    /// Returns `DomainError::DuplicateId` naming the first repeated id.
    pub fn from_ids(ids: Vec<ItemId>) -> Result<Self, DomainError> {
        let mut list = Self::new();
        for id in ids {
            list.push(id)?;
        }
        Ok(list)
    }

    /// Append an id
    ///
    /// # Errors
    /// Returns `DomainError::DuplicateId` if the id is already present.
    pub fn push(&mut self, id: ItemId) -> Result<(), DomainError> {
        if self.0.contains(&id) {
            return Err(DomainError::DuplicateId(id.as_str().to_string()));
        }
        self.0.push(id);
        Ok(())
    }

    /// Whether the id is currently in the list
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.0.contains(id)
    }

    /// Number of ids in the list
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the list exceeds the configured soft cap
    #[must_use]
    pub fn exceeds_cap(&self, cap: usize) -> bool {
        self.0.len() > cap
    }

    /// Iterate ids in list order
    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.0.iter()
    }

    /// The first `cap` ids - the slice a sync batch is built from
    #[must_use]
    pub fn capped(&self, cap: usize) -> &[ItemId] {
        &self.0[..self.0.len().min(cap)]
    }

    /// Rebuild the list after reconciliation: drop every id in `removed`,
    /// append every id in `added`, then impose `order`
    ///
    /// Additions already present (or repeated) are dropped rather than
    /// duplicated.
    #[must_use]
    pub fn rebuilt<'a>(
        &self,
        removed: impl IntoIterator<Item = &'a ItemId>,
        added: impl IntoIterator<Item = ItemId>,
        order: ListOrder,
    ) -> Self {
        let removed: Vec<&ItemId> = removed.into_iter().collect();
        let mut next: Vec<ItemId> = self
            .0
            .iter()
            .filter(|id| !removed.contains(id))
            .cloned()
            .collect();
        for id in added {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        if order == ListOrder::ById {
            next.sort();
        }
        Self(next)
    }
}

impl IntoIterator for WorkingList {
    type Item = ItemId;
    type IntoIter = std::vec::IntoIter<ItemId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::new(s.to_string()).unwrap()
    }

    #[test]
    fn test_push_rejects_duplicates() {
        let mut list = WorkingList::new();
        list.push(id("a")).unwrap();
        let err = list.push(id("a")).unwrap_err();
        assert_eq!(err, DomainError::DuplicateId("a".to_string()));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_capped() {
        let list = WorkingList::from_ids(vec![id("a"), id("b"), id("c")]).unwrap();
        assert_eq!(list.capped(2).len(), 2);
        assert_eq!(list.capped(10).len(), 3);
    }

    #[test]
    fn test_exceeds_cap() {
        let list = WorkingList::from_ids(vec![id("a"), id("b")]).unwrap();
        assert!(list.exceeds_cap(1));
        assert!(!list.exceeds_cap(2));
    }

    #[test]
    fn test_rebuilt_by_id_sorts() {
        let list = WorkingList::from_ids(vec![id("c"), id("a")]).unwrap();
        let next = list.rebuilt([&id("a")], vec![id("b")], ListOrder::ById);
        let ids: Vec<&str> = next.iter().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_rebuilt_insertion_appends() {
        let list = WorkingList::from_ids(vec![id("c"), id("a")]).unwrap();
        let next = list.rebuilt([], vec![id("b")], ListOrder::Insertion);
        let ids: Vec<&str> = next.iter().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_rebuilt_deduplicates_additions() {
        let list = WorkingList::from_ids(vec![id("a")]).unwrap();
        let next = list.rebuilt([], vec![id("a"), id("b"), id("b")], ListOrder::ById);
        let ids: Vec<&str> = next.iter().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_rebuilt_remove_and_add_same_cycle() {
        // a rename removes the old id and adds the new one in one pass
        let list = WorkingList::from_ids(vec![id("~0.x"), id("r1")]).unwrap();
        let next = list.rebuilt([&id("~0.x")], vec![id("r7")], ListOrder::ById);
        let ids: Vec<&str> = next.iter().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["r1", "r7"]);
    }

    #[test]
    fn test_serde_transparent() {
        let list = WorkingList::from_ids(vec![id("a"), id("b")]).unwrap();
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let parsed: WorkingList = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, list);
    }
}
