//! Actor tables on top of hecs
//!
//! Actors are looked up by component type. Every listing is sorted by entity
//! id so iteration order, and with it the RNG draw order, never depends on
//! archetype layout.

use hecs::Entity;

/// Actor storage. Entity handles are the identities of enemies, rocks,
/// fruit and fire hazards.
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create an empty world
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an actor
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Remove an actor
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Remove several actors, skipping handles that are already gone.
    /// Returns how many were removed.
    pub fn despawn_all(&mut self, entities: impl IntoIterator<Item = Entity>) -> usize {
        entities
            .into_iter()
            .filter(|&e| self.inner.despawn(e).is_ok())
            .count()
    }

    /// Borrow a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Borrow a component mutably
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Whether the actor still exists
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Handles of every actor carrying `T`, ordered by entity id.
    ///
    /// Collecting first lets callers mutate other actors while walking
    /// the list.
    #[must_use]
    pub fn handles<T: hecs::Component>(&self) -> Vec<Entity> {
        self.handles_where::<T>(|_| true)
    }

    /// Like [`World::handles`], keeping only actors whose `T` passes `keep`
    #[must_use]
    pub fn handles_where<T: hecs::Component>(&self, keep: impl Fn(&T) -> bool) -> Vec<Entity> {
        let mut handles: Vec<Entity> = self
            .inner
            .query::<&T>()
            .iter()
            .filter(|(_, component)| keep(component))
            .map(|(entity, _)| entity)
            .collect();
        handles.sort_by_key(|e| e.id());
        handles
    }

    /// Number of actors carrying `T`
    #[must_use]
    pub fn count<T: hecs::Component>(&self) -> usize {
        self.inner.query::<&T>().iter().count()
    }

    /// Query actors
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query actors mutably
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
