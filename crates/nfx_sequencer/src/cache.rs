//! Per-record position cache.
//!
//! Slots are indexed directly by extension id. Every slot carries the
//! generation it was written in; bumping the cache generation invalidates
//! all slots at once, so a reset costs nothing per record.

/// Location of an extension payload within the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Payload offset from the start of the record.
    pub offset: usize,
    /// Payload length in bytes.
    pub length: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    generation: u32,
    offset: u32,
    length: u32,
}

/// Transient map from extension id to its position in one record.
///
/// A cache belongs to one worker. Share the [`crate::SequencePlan`], not the
/// cache.
#[derive(Debug, Clone)]
pub struct PositionCache {
    slots: Vec<Slot>,
    generation: u32,
}

impl PositionCache {
    /// Creates a cache for ids `0..capacity`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::default(); capacity],
            generation: 1,
        }
    }

    /// Number of ids the cache can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Invalidates every cached position.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.slots.fill(Slot::default());
            self.generation = 1;
        }
    }

    pub(crate) fn ensure_capacity(&mut self, capacity: usize) {
        if self.slots.len() < capacity {
            self.slots.resize(capacity, Slot::default());
        }
    }

    /// Records the position of `id`, returning true if it was already set
    /// for the current record.
    pub(crate) fn insert(&mut self, id: u16, position: Position) -> bool {
        let generation = self.generation;
        let Some(slot) = self.slots.get_mut(usize::from(id)) else {
            return false;
        };

        let seen = slot.generation == generation;
        // Records are bounded by the 16-bit size field.
        *slot = Slot {
            generation,
            offset: position.offset as u32,
            length: position.length as u32,
        };
        seen
    }

    /// Returns the position of `id` in the current record.
    #[inline]
    #[must_use]
    pub fn get(&self, id: u16) -> Option<Position> {
        self.slots
            .get(usize::from(id))
            .filter(|slot| slot.generation == self.generation)
            .map(|slot| Position {
                offset: slot.offset as usize,
                length: slot.length as usize,
            })
    }

    /// Iterates over the cached positions in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, Position)> + '_ {
        (0..self.slots.len()).filter_map(move |index| {
            let id = index as u16;
            self.get(id).map(|position| (id, position))
        })
    }

    /// Returns true if nothing is cached for the current record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT_16: Position = Position {
        offset: 16,
        length: 8,
    };

    #[test]
    fn insert_and_get() {
        let mut cache = PositionCache::new(31);
        assert!(cache.is_empty());

        assert!(!cache.insert(4, AT_16));
        assert_eq!(cache.get(4), Some(AT_16));
        assert_eq!(cache.get(5), None);
        assert!(cache.insert(4, AT_16));
    }

    #[test]
    fn reset_invalidates_all_slots() {
        let mut cache = PositionCache::new(31);
        cache.insert(4, AT_16);
        cache.insert(8, AT_16);

        cache.reset();
        assert!(cache.is_empty());
        assert_eq!(cache.get(4), None);
        assert!(!cache.insert(4, AT_16));
    }

    #[test]
    fn generation_wraparound_clears_slots() {
        let mut cache = PositionCache::new(8);
        cache.generation = u32::MAX;
        cache.insert(3, AT_16);
        assert_eq!(cache.get(3), Some(AT_16));

        cache.reset();
        assert_eq!(cache.generation, 1);
        assert_eq!(cache.get(3), None);
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        let mut cache = PositionCache::new(8);
        assert!(!cache.insert(100, AT_16));
        assert_eq!(cache.get(100), None);

        cache.ensure_capacity(101);
        cache.insert(100, AT_16);
        assert_eq!(cache.get(100), Some(AT_16));
    }

    #[test]
    fn iter_in_id_order() {
        let mut cache = PositionCache::new(31);
        cache.insert(8, AT_16);
        cache.insert(4, Position { offset: 28, length: 8 });

        let ids: Vec<u16> = cache.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![4, 8]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashMap;

        proptest! {
            #[test]
            fn behaves_like_a_map_reset_per_record(
                records in prop::collection::vec(
                    prop::collection::vec((0u16..40, 0usize..1024, 0usize..256), 0..12),
                    1..8,
                ),
            ) {
                let mut cache = PositionCache::new(40);
                for inserts in records {
                    cache.reset();
                    let mut model = HashMap::new();
                    for (id, offset, length) in inserts {
                        let position = Position { offset, length };
                        let seen = cache.insert(id, position);
                        prop_assert_eq!(seen, model.insert(id, position).is_some());
                    }
                    for id in 0..40u16 {
                        prop_assert_eq!(cache.get(id), model.get(&id).copied());
                    }
                }
            }
        }
    }
}
