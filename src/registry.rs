//! Entity registry: the sector's ownership store
//!
//! One insertion-ordered sequence owns every live object (iteration
//! order is update/draw/write order), plus five non-owning kind
//! indices the collision resolver scans instead of the whole
//! sequence. The indices are purely derived state; registration and
//! reclaim keep them consistent.
//!
//! # Concurrency discipline
//!
//! The registry is the single writer. Update and collision callbacks
//! request changes - register new objects, flip validity flags - but
//! physical removal happens only in `reclaim_invalid` at frame end.
//! During dispatch an object is temporarily *checked out* of its slot
//! so it can receive `&mut self` while the rest of the sector stays
//! reachable; the slot itself never moves, so ids and iteration
//! positions stay stable within the frame.

use crate::object::{Object, TrackedKind};

/// Stable identity of a registered object. Never reused within a
/// sector's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

struct Slot {
    id: ObjectId,
    /// `None` only while the object is checked out for dispatch.
    object: Option<Object>,
}

#[derive(Default)]
pub struct ObjectRegistry {
    slots: Vec<Slot>,
    next_id: u64,
    projectiles: Vec<ObjectId>,
    enemies: Vec<ObjectId>,
    power_ups: Vec<ObjectId>,
    trampolines: Vec<ObjectId>,
    flying_platforms: Vec<ObjectId>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        ObjectRegistry::default()
    }

    /// Take ownership of an object. Appends it to the main sequence
    /// and, for tracked kinds, to that kind's index. Always succeeds.
    pub fn register(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        if let Some(kind) = object.tracked_kind() {
            self.index_mut(kind).push(id);
        }
        self.slots.push(Slot {
            id,
            object: Some(object),
        });
        id
    }

    /// Read-only view of one kind index, for the collision resolver.
    pub fn index(&self, kind: TrackedKind) -> &[ObjectId] {
        match kind {
            TrackedKind::Projectile => &self.projectiles,
            TrackedKind::Enemy => &self.enemies,
            TrackedKind::PowerUp => &self.power_ups,
            TrackedKind::Trampoline => &self.trampolines,
            TrackedKind::FlyingPlatform => &self.flying_platforms,
        }
    }

    fn index_mut(&mut self, kind: TrackedKind) -> &mut Vec<ObjectId> {
        match kind {
            TrackedKind::Projectile => &mut self.projectiles,
            TrackedKind::Enemy => &mut self.enemies,
            TrackedKind::PowerUp => &mut self.power_ups,
            TrackedKind::Trampoline => &mut self.trampolines,
            TrackedKind::FlyingPlatform => &mut self.flying_platforms,
        }
    }

    /// Number of slots in the main sequence right now. Re-read this
    /// every iteration of the update pass: it grows when callbacks
    /// register new objects mid-frame.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)?
            .object
            .as_ref()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)?
            .object
            .as_mut()
    }

    /// Check an object out of its slot for dispatch. The slot stays in
    /// place; pair every checkout with a `restore`.
    pub(crate) fn checkout(&mut self, id: ObjectId) -> Option<Object> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)?
            .object
            .take()
    }

    /// Check out by sequence position (the update pass iterates by
    /// index, not by id).
    pub(crate) fn checkout_at(&mut self, position: usize) -> Option<(ObjectId, Object)> {
        let slot = self.slots.get_mut(position)?;
        let object = slot.object.take()?;
        Some((slot.id, object))
    }

    pub(crate) fn restore(&mut self, id: ObjectId, object: Object) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == id) {
            debug_assert!(slot.object.is_none(), "restoring into an occupied slot");
            slot.object = Some(object);
        }
    }

    /// Iterate live objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.slots
            .iter()
            .filter_map(|slot| Some((slot.id, slot.object.as_ref()?)))
    }

    /// End-of-frame reclaim: drop every object whose validity flag is
    /// false, removing it from its kind index (if any) first and from
    /// the main sequence after. Objects registered earlier in the same
    /// frame survive unless they are already invalid.
    pub fn reclaim_invalid(&mut self) {
        let mut reclaimed: Vec<(ObjectId, Option<TrackedKind>)> = Vec::new();

        self.slots.retain(|slot| match &slot.object {
            Some(object) if !object.is_valid() => {
                reclaimed.push((slot.id, object.tracked_kind()));
                false
            }
            _ => true,
        });

        for (id, kind) in reclaimed {
            if let Some(kind) = kind {
                self.index_mut(kind).retain(|entry| *entry != id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::FloatingScore;
    use crate::enemy::{Enemy, EnemyKind};
    use crate::math::{Rectangle, Vector};
    use crate::object::{CollisionKind, Contact, ContactKind};
    use crate::platforms::Trampoline;
    use crate::projectile::{Projectile, ProjectileKind};

    fn enemy() -> Object {
        Object::Enemy(Enemy::new(EnemyKind::Crawler, 0.0, 0.0))
    }

    #[test]
    fn test_register_appends_to_main_sequence_and_kind_index() {
        let mut registry = ObjectRegistry::new();

        let e = registry.register(enemy());
        let t = registry.register(Object::Trampoline(Trampoline::new(0.0, 0.0)));
        let p = registry.register(Object::Projectile(Projectile::new(
            ProjectileKind::Fire,
            Vector::zero(),
            0.0,
            crate::object::Direction::Right,
        )));

        assert_eq!(registry.slot_count(), 3);
        assert_eq!(registry.index(TrackedKind::Enemy), [e]);
        assert_eq!(registry.index(TrackedKind::Trampoline), [t]);
        assert_eq!(registry.index(TrackedKind::Projectile), [p]);
        assert!(registry.index(TrackedKind::PowerUp).is_empty());
    }

    #[test]
    fn test_untracked_objects_join_no_index() {
        let mut registry = ObjectRegistry::new();
        registry.register(Object::FloatingScore(FloatingScore::new(
            Vector::zero(),
            100,
        )));

        assert_eq!(registry.slot_count(), 1);
        for kind in [
            TrackedKind::Projectile,
            TrackedKind::Enemy,
            TrackedKind::PowerUp,
            TrackedKind::Trampoline,
            TrackedKind::FlyingPlatform,
        ] {
            assert!(registry.index(kind).is_empty());
        }
    }

    #[test]
    fn test_each_object_appears_once_in_exactly_one_index() {
        let mut registry = ObjectRegistry::new();
        let ids: Vec<ObjectId> = (0..3).map(|_| registry.register(enemy())).collect();

        for id in &ids {
            let occurrences: usize = [
                TrackedKind::Projectile,
                TrackedKind::Enemy,
                TrackedKind::PowerUp,
                TrackedKind::Trampoline,
                TrackedKind::FlyingPlatform,
            ]
            .into_iter()
            .map(|kind| registry.index(kind).iter().filter(|e| *e == id).count())
            .sum();
            assert_eq!(occurrences, 1);
        }
    }

    #[test]
    fn test_reclaim_removes_invalid_from_sequence_and_index() {
        let mut registry = ObjectRegistry::new();
        let keep = registry.register(Object::Projectile(Projectile::new(
            ProjectileKind::Fire,
            Vector::zero(),
            0.0,
            crate::object::Direction::Right,
        )));
        let spent = registry.register(Object::Projectile(Projectile::new(
            ProjectileKind::Ice,
            Vector::zero(),
            0.0,
            crate::object::Direction::Left,
        )));

        // A shot that hit an enemy flips its validity flag.
        if let Some(Object::Projectile(shot)) = registry.get_mut(spent) {
            let contact = Contact {
                kind: ContactKind::Enemy,
                base: Rectangle::new(0.0, 0.0, 32.0, 32.0),
            };
            shot.collision(&contact, CollisionKind::Normal);
        }

        registry.reclaim_invalid();

        assert!(registry.get(keep).is_some());
        assert!(registry.get(spent).is_none());
        assert_eq!(registry.index(TrackedKind::Projectile), [keep]);
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let mut registry = ObjectRegistry::new();
        let a = registry.register(enemy());
        let b = registry.register(Object::Trampoline(Trampoline::new(0.0, 0.0)));
        let c = registry.register(enemy());

        let order: Vec<ObjectId> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(order, [a, b, c]);
    }
}
