//! Contact tracking: the live set of fingers currently on the surface.
//!
//! The registry is a plain id-to-contact map with a hard capacity. It
//! knows nothing about phases or timers; admission while locked is the
//! session's concern, capacity is ours.

use std::collections::BTreeMap;

use thiserror::Error;

/// Contact identifiers are assigned by the input source (hardware slot
/// or simulated pointer) and may be reused after a release.
pub type ContactId = u32;

/// Number of distinct marker colors the presentation layer carries.
/// `color_index` is always below this.
pub const PALETTE_SIZE: usize = 10;

/// Default maximum number of concurrent contacts.
pub const DEFAULT_CAPACITY: usize = 10;

// ════════════════════════════════════════════════════════════════════════════
// Contact
// ════════════════════════════════════════════════════════════════════════════

/// One active touch point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub x:  f32,
    pub y:  f32,
    /// Palette slot, fixed at creation as `id % PALETTE_SIZE`. Ids past
    /// the palette wrap around, so two live contacts can share a color
    /// in a long session with many re-touches.
    pub color_index: usize,
    /// True until the contact is excluded from a committed verdict.
    pub active: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Rejected — why an admission was refused
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Rejected {
    /// The surface reported more simultaneous points than we track.
    /// Dropped silently by callers; extra fingers simply get no marker.
    #[error("contact capacity of {capacity} exceeded")]
    CapacityExceeded { capacity: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// TouchRegistry
// ════════════════════════════════════════════════════════════════════════════

/// Mapping from contact id to [`Contact`].
///
/// Backed by a `BTreeMap` so [`snapshot`](TouchRegistry::snapshot)
/// iterates in ascending id order, which keeps selection inputs and
/// test expectations deterministic.
#[derive(Clone, Debug)]
pub struct TouchRegistry {
    contacts: BTreeMap<ContactId, Contact>,
    capacity: usize,
}

impl TouchRegistry {
    pub fn new(capacity: usize) -> Self {
        TouchRegistry {
            contacts: BTreeMap::new(),
            capacity,
        }
    }

    /// Admit a new contact at (x, y).
    ///
    /// A re-down for an id that is already tracked is treated as a
    /// position update and succeeds; hardware occasionally repeats a
    /// down event without a matching up.
    pub fn add(&mut self, id: ContactId, x: f32, y: f32) -> Result<(), Rejected> {
        if let Some(contact) = self.contacts.get_mut(&id) {
            contact.x = x;
            contact.y = y;
            return Ok(());
        }
        if self.contacts.len() >= self.capacity {
            return Err(Rejected::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.contacts.insert(
            id,
            Contact {
                id,
                x,
                y,
                color_index: id as usize % PALETTE_SIZE,
                active: true,
            },
        );
        Ok(())
    }

    /// Update a contact's position. No-op for unknown ids.
    pub fn move_to(&mut self, id: ContactId, x: f32, y: f32) {
        if let Some(contact) = self.contacts.get_mut(&id) {
            contact.x = x;
            contact.y = y;
        }
    }

    /// Drop a contact. Returns whether anything was removed, so the
    /// caller knows a structural change happened.
    pub fn remove(&mut self, id: ContactId) -> bool {
        self.contacts.remove(&id).is_some()
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read-only copy of the contact set in ascending id order.
    pub fn snapshot(&self) -> Vec<Contact> {
        self.contacts.values().copied().collect()
    }

    /// Mark `winner` active and everything else inactive. Used once,
    /// right after a choose-mode verdict is committed.
    pub fn set_sole_active(&mut self, winner: ContactId) {
        for contact in self.contacts.values_mut() {
            contact.active = contact.id == winner;
        }
    }

    /// Empty the registry unconditionally.
    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}

impl Default for TouchRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_enforced() {
        let mut reg = TouchRegistry::default();
        for id in 0..10 {
            assert!(reg.add(id, 0.0, 0.0).is_ok());
        }
        assert_eq!(
            reg.add(10, 5.0, 5.0),
            Err(Rejected::CapacityExceeded { capacity: 10 })
        );
        assert_eq!(reg.len(), 10);
    }

    #[test]
    fn snapshot_is_ascending_by_id() {
        let mut reg = TouchRegistry::default();
        for id in [5u32, 1, 9, 3] {
            reg.add(id, id as f32, 0.0).unwrap();
        }
        let ids: Vec<ContactId> = reg.snapshot().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3, 5, 9]);
    }

    #[test]
    fn color_index_wraps_at_palette_size() {
        let mut reg = TouchRegistry::new(20);
        reg.add(3, 0.0, 0.0).unwrap();
        reg.add(13, 0.0, 0.0).unwrap();
        assert_eq!(reg.get(3).unwrap().color_index, 3);
        assert_eq!(reg.get(13).unwrap().color_index, 3);
    }

    #[test]
    fn move_updates_position_only() {
        let mut reg = TouchRegistry::default();
        reg.add(2, 1.0, 1.0).unwrap();
        reg.move_to(2, 40.0, 80.0);
        let c = reg.get(2).unwrap();
        assert_eq!((c.x, c.y), (40.0, 80.0));
        assert_eq!(c.color_index, 2);
        assert!(c.active);
    }

    #[test]
    fn move_and_remove_of_unknown_id_are_noops() {
        let mut reg = TouchRegistry::default();
        reg.add(1, 0.0, 0.0).unwrap();
        reg.move_to(7, 9.0, 9.0);
        assert!(!reg.remove(7));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn redown_refreshes_position_without_a_second_slot() {
        let mut reg = TouchRegistry::default();
        reg.add(4, 1.0, 2.0).unwrap();
        reg.add(4, 30.0, 40.0).unwrap();
        assert_eq!(reg.len(), 1);
        let c = reg.get(4).unwrap();
        assert_eq!((c.x, c.y), (30.0, 40.0));
    }

    #[test]
    fn set_sole_active_demotes_everyone_else() {
        let mut reg = TouchRegistry::default();
        for id in 0..4 {
            reg.add(id, 0.0, 0.0).unwrap();
        }
        reg.set_sole_active(2);
        for c in reg.snapshot() {
            assert_eq!(c.active, c.id == 2, "contact {}", c.id);
        }
    }

    #[test]
    fn clear_empties_the_registry() {
        let mut reg = TouchRegistry::default();
        reg.add(0, 0.0, 0.0).unwrap();
        reg.add(1, 0.0, 0.0).unwrap();
        reg.clear();
        assert!(reg.is_empty());
        assert!(reg.snapshot().is_empty());
    }
}
