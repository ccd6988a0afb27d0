/*!
Per-step collision pair index.

The index is rebuilt from scratch by every `WorldManager::update`; nothing
carries over between steps. Pairs are stored in both directions so a lookup
from either participant succeeds:

```text
contacts_of(a).contains(b)  <=>  contacts_of(b).contains(a)
```

Ordered collections keep iteration deterministic across runs.
*/

use std::collections::{BTreeMap, BTreeSet};

use crate::scene::SceneObjectId;

static NO_CONTACTS: BTreeSet<SceneObjectId> = BTreeSet::new();

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionIndex {
    contacts: BTreeMap<SceneObjectId, BTreeSet<SceneObjectId>>,
    skipped_manifolds: usize,
}

impl CollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids currently touching `id`. Unknown or non-colliding ids yield an empty set.
    pub fn contacts_of(&self, id: SceneObjectId) -> &BTreeSet<SceneObjectId> {
        self.contacts.get(&id).unwrap_or(&NO_CONTACTS)
    }

    #[inline]
    pub fn is_contacting(&self, a: SceneObjectId, b: SceneObjectId) -> bool {
        self.contacts_of(a).contains(&b)
    }

    /// Every touching pair once, smaller id first.
    pub fn pairs(&self) -> impl Iterator<Item = (SceneObjectId, SceneObjectId)> + '_ {
        self.contacts.iter().flat_map(|(&a, others)| {
            others
                .range((std::ops::Bound::Excluded(a), std::ops::Bound::Unbounded))
                .map(move |&b| (a, b))
        })
    }

    /// Number of distinct touching pairs.
    pub fn len(&self) -> usize {
        self.pairs().count()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Contact manifolds dropped during the last rebuild because a side had no
    /// registered scene object.
    pub fn skipped_manifolds(&self) -> usize {
        self.skipped_manifolds
    }

    pub(crate) fn clear(&mut self) {
        self.contacts.clear();
        self.skipped_manifolds = 0;
    }

    /// Record a contact in both directions. Self-contacts are ignored.
    pub(crate) fn insert_pair(&mut self, a: SceneObjectId, b: SceneObjectId) {
        if a == b {
            return;
        }
        self.contacts.entry(a).or_default().insert(b);
        self.contacts.entry(b).or_default().insert(a);
    }

    pub(crate) fn note_skipped(&mut self) {
        self.skipped_manifolds += 1;
    }

    /// Drop `id` and every reference to it.
    pub(crate) fn remove_object(&mut self, id: SceneObjectId) {
        let Some(others) = self.contacts.remove(&id) else {
            return;
        };
        for other in others {
            if let Some(set) = self.contacts.get_mut(&other) {
                set.remove(&id);
                if set.is_empty() {
                    self.contacts.remove(&other);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_id_has_no_contacts() {
        let index = CollisionIndex::new();
        assert!(index.contacts_of(42).is_empty());
        assert!(!index.is_contacting(42, 7));
    }

    #[test]
    fn insert_is_symmetric() {
        let mut index = CollisionIndex::new();
        index.insert_pair(1, 2);
        index.insert_pair(3, 1);

        for (a, b) in index.pairs().collect::<Vec<_>>() {
            assert!(index.is_contacting(a, b));
            assert!(index.is_contacting(b, a));
        }
        assert_eq!(index.pairs().collect::<Vec<_>>(), vec![(1, 2), (1, 3)]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn duplicate_inserts_collapse() {
        let mut index = CollisionIndex::new();
        index.insert_pair(1, 2);
        index.insert_pair(2, 1);
        assert_eq!(index.len(), 1);
        assert_eq!(index.contacts_of(2).len(), 1);
    }

    #[test]
    fn self_contact_is_ignored() {
        let mut index = CollisionIndex::new();
        index.insert_pair(5, 5);
        assert!(index.is_empty());
    }

    #[test]
    fn remove_object_drops_both_directions() {
        let mut index = CollisionIndex::new();
        index.insert_pair(1, 2);
        index.insert_pair(2, 3);
        index.remove_object(2);

        assert!(index.contacts_of(2).is_empty());
        assert!(index.contacts_of(1).is_empty());
        assert!(index.contacts_of(3).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn clear_resets_skip_counter() {
        let mut index = CollisionIndex::new();
        index.insert_pair(1, 2);
        index.note_skipped();
        assert_eq!(index.skipped_manifolds(), 1);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.skipped_manifolds(), 0);
    }
}
