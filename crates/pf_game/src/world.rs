//! Entity arena with role membership.
//!
//! Entities live in one id-keyed map. Roles are id sets layered on top, so an
//! entity can belong to several at once and `kill` drops it from all of them
//! in one step. Iteration is in id order, which is creation order.

use std::collections::{BTreeMap, BTreeSet};

use crate::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Level geometry the player collides with.
    Collision,
    Enemy,
    Bullet,
    Gift,
    /// Has per-frame behaviour.
    Actor,
}

impl Role {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            Role::Collision => 0,
            Role::Enemy => 1,
            Role::Bullet => 2,
            Role::Gift => 3,
            Role::Actor => 4,
        }
    }
}

#[derive(Debug, Default)]
pub struct World {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    roles: [BTreeSet<EntityId>; Role::COUNT],
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: Entity, roles: &[Role]) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, entity);
        for role in roles {
            self.roles[role.index()].insert(id);
        }
        id
    }

    /// Removes the entity from the world and every role. Killing an id that
    /// is already gone is a no-op.
    pub fn kill(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        for members in &mut self.roles {
            members.remove(&id);
        }
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    /// Snapshot of a role's members, safe to hold while killing entities.
    pub fn members(&self, role: Role) -> Vec<EntityId> {
        self.roles[role.index()].iter().copied().collect()
    }

    pub fn role_len(&self, role: Role) -> usize {
        self.roles[role.index()].len()
    }

    #[cfg(test)]
    pub fn has_role(&self, id: EntityId, role: Role) -> bool {
        self.roles[role.index()].contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageId;
    use crate::entity::{DrawLayer, EntityKind, Sprite};
    use crate::rect::FRect;

    fn gift() -> Entity {
        Entity::new(
            Sprite::new(FRect::new(0.0, 0.0, 8.0, 8.0), ImageId::from_index(0)),
            DrawLayer::Items,
            EntityKind::Gift,
        )
    }

    #[test]
    fn spawn_registers_roles() {
        let mut world = World::new();
        let id = world.spawn(gift(), &[Role::Gift, Role::Collision]);
        assert!(world.has_role(id, Role::Gift));
        assert!(world.has_role(id, Role::Collision));
        assert!(!world.has_role(id, Role::Enemy));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn kill_removes_from_every_role() {
        let mut world = World::new();
        let a = world.spawn(gift(), &[Role::Gift, Role::Actor]);
        let b = world.spawn(gift(), &[Role::Gift]);
        assert!(world.kill(a).is_some());
        assert!(!world.contains(a));
        assert_eq!(world.members(Role::Gift), vec![b]);
        assert_eq!(world.role_len(Role::Actor), 0);
        assert!(world.kill(a).is_none());
    }

    #[test]
    fn ids_are_creation_ordered() {
        let mut world = World::new();
        let first = world.spawn(gift(), &[]);
        let second = world.spawn(gift(), &[]);
        assert!(first < second);
        let order: Vec<_> = world.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![first, second]);
    }
}
