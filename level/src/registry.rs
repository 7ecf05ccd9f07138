//! Entity placements stored alongside the tile grid.

use wizard_dungeon_core::{Coordinate, EntityKind, FlipDirection, Marker};

use crate::grid::mirror;

/// Registry of enemy and fire positions plus the start and goal markers.
///
/// Sequences preserve insertion order and tolerate duplicates; lookups are
/// linear, which suits levels holding tens of entities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityRegistry {
    enemies: Vec<Coordinate>,
    fires: Vec<Coordinate>,
    start: Option<Coordinate>,
    goal: Option<Coordinate>,
}

/// Entities dropped while shrinking the registry to new bounds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pruned {
    pub(crate) entities: Vec<(EntityKind, Coordinate)>,
    pub(crate) markers: Vec<(Marker, Coordinate)>,
}

impl EntityRegistry {
    /// Creates an empty registry with both markers unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Positions stored for the provided entity kind, in insertion order.
    #[must_use]
    pub fn positions(&self, kind: EntityKind) -> &[Coordinate] {
        match kind {
            EntityKind::Enemy => &self.enemies,
            EntityKind::Fire => &self.fires,
        }
    }

    /// Reports whether an entity of the given kind sits at the coordinate.
    #[must_use]
    pub fn contains(&self, kind: EntityKind, at: Coordinate) -> bool {
        self.positions(kind).contains(&at)
    }

    /// Appends an entity without checking for duplicates.
    pub fn insert(&mut self, kind: EntityKind, at: Coordinate) {
        self.sequence_mut(kind).push(at);
    }

    /// Removes the first entity of the given kind at the coordinate.
    ///
    /// Returns `false` when no such entity exists.
    pub fn remove(&mut self, kind: EntityKind, at: Coordinate) -> bool {
        let sequence = self.sequence_mut(kind);
        match sequence.iter().position(|candidate| *candidate == at) {
            Some(index) => {
                let _ = sequence.remove(index);
                true
            }
            None => false,
        }
    }

    /// Current location of a marker, if set.
    #[must_use]
    pub const fn marker(&self, marker: Marker) -> Option<Coordinate> {
        match marker {
            Marker::Start => self.start,
            Marker::Goal => self.goal,
        }
    }

    /// Moves or clears a marker, returning its previous location.
    pub fn set_marker(&mut self, marker: Marker, at: Option<Coordinate>) -> Option<Coordinate> {
        let slot = match marker {
            Marker::Start => &mut self.start,
            Marker::Goal => &mut self.goal,
        };
        std::mem::replace(slot, at)
    }

    /// Iterates over every stored coordinate, markers included.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.enemies
            .iter()
            .chain(self.fires.iter())
            .copied()
            .chain(self.start)
            .chain(self.goal)
    }

    /// Drops every entity and marker lying outside a `width` by `height` grid.
    ///
    /// A single filtering pass per sequence; survivors keep their order.
    pub(crate) fn retain_within(&mut self, width: u32, height: u32) -> Pruned {
        let mut pruned = Pruned::default();

        for kind in [EntityKind::Enemy, EntityKind::Fire] {
            self.sequence_mut(kind).retain(|at| {
                let keep = at.is_within(width, height);
                if !keep {
                    pruned.entities.push((kind, *at));
                }
                keep
            });
        }

        for marker in [Marker::Start, Marker::Goal] {
            if let Some(at) = self.marker(marker) {
                if !at.is_within(width, height) {
                    let _ = self.set_marker(marker, None);
                    pruned.markers.push((marker, at));
                }
            }
        }

        pruned
    }

    /// Mirrors every stored coordinate within a `width` by `height` grid.
    pub(crate) fn flip(&mut self, direction: FlipDirection, width: u32, height: u32) {
        let reflect = |at: Coordinate| mirror(at, direction, width, height);
        for at in self.enemies.iter_mut().chain(self.fires.iter_mut()) {
            *at = reflect(*at);
        }
        self.start = self.start.map(reflect);
        self.goal = self.goal.map(reflect);
    }

    fn sequence_mut(&mut self, kind: EntityKind) -> &mut Vec<Coordinate> {
        match kind {
            EntityKind::Enemy => &mut self.enemies,
            EntityKind::Fire => &mut self.fires,
        }
    }
}
