//! In-memory world for development and testing.
//!
//! Holds just enough state to answer every [`WorldView`] question and records
//! every [`WorldMutator`] call as a [`WorldEvent`], in order.

use crate::errors::{WorldError, WorldResult};
use crate::traits::{WorldMutator, WorldView};
use parking_lot::RwLock;
use quicktravel_types::{ActorId, ActorSnapshot, BlockPos, Coordinate, Facing, SpawnPoint};
use std::collections::{HashMap, HashSet};

/// Edge length of a square region, in blocks
pub const REGION_SIZE: i32 = 16;

/// Horizontal index of a region
pub type RegionPos = (i32, i32);

/// The region holding `block`
pub fn region_of(block: &BlockPos) -> RegionPos {
    (block.x.div_euclid(REGION_SIZE), block.z.div_euclid(REGION_SIZE))
}

/// A mutation observed by the simulated world
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    /// A region was loaded and held for an actor
    RegionHeld {
        /// Actor the region is held for
        actor: ActorId,
        /// Region that was held
        region: RegionPos,
    },
    /// An actor stopped riding
    Dismounted(ActorId),
    /// An actor was woken
    Woke(ActorId),
    /// An actor was placed
    Moved {
        /// Actor that moved
        actor: ActorId,
        /// Position before the move
        from: Coordinate,
        /// Position after the move
        to: Coordinate,
        /// Facing after the move
        facing: Facing,
    },
    /// An actor's velocity was zeroed
    Halted(ActorId),
    /// Relocation feedback was played
    Effects {
        /// Departure point
        from: Coordinate,
        /// Arrival point
        to: Coordinate,
    },
}

#[derive(Default)]
struct SimState {
    origin: BlockPos,
    actors: HashMap<ActorId, ActorSnapshot>,
    resting_surfaces: HashSet<BlockPos>,
    obstructed: HashSet<BlockPos>,
    unloaded: HashSet<RegionPos>,
    failing: HashSet<RegionPos>,
    events: Vec<WorldEvent>,
}

/// A world that lives entirely in memory.
///
/// Every region is loaded unless marked otherwise; every resting block must
/// be registered with [`SimulatedWorld::add_resting_surface`].
#[derive(Default)]
pub struct SimulatedWorld {
    state: RwLock<SimState>,
}

impl SimulatedWorld {
    /// Create an empty world with its origin at `[0, 0, 0]`
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the world origin
    pub fn with_origin(self, origin: BlockPos) -> Self {
        self.state.write().origin = origin;
        self
    }

    /// Bring an actor online, or replace its snapshot
    pub fn add_actor(&self, actor: ActorSnapshot) {
        self.state.write().actors.insert(actor.id, actor);
    }

    /// Take an actor offline
    pub fn remove_actor(&self, id: &ActorId) -> Option<ActorSnapshot> {
        self.state.write().actors.remove(id)
    }

    /// Teleport an actor without recording an event
    pub fn place_actor(&self, id: &ActorId, position: Coordinate) {
        if let Some(actor) = self.state.write().actors.get_mut(id) {
            actor.position = position;
        }
    }

    /// Put a restable block at `block`
    pub fn add_resting_surface(&self, block: BlockPos) {
        let mut state = self.state.write();
        state.resting_surfaces.insert(block);
        state.obstructed.remove(&block);
    }

    /// Remove the restable block at `block`
    pub fn remove_resting_surface(&self, block: &BlockPos) {
        self.state.write().resting_surfaces.remove(block);
    }

    /// Keep the block but leave no room to wake up next to it
    pub fn obstruct(&self, block: BlockPos) {
        self.state.write().obstructed.insert(block);
    }

    /// Mark the region holding `block` as not loaded
    pub fn unload_region(&self, block: &BlockPos) {
        self.state.write().unloaded.insert(region_of(block));
    }

    /// Make every attempt to hold the region around `block` fail
    pub fn fail_region(&self, block: &BlockPos) {
        self.state.write().failing.insert(region_of(block));
    }

    /// Every mutation so far, oldest first
    pub fn events(&self) -> Vec<WorldEvent> {
        self.state.read().events.clone()
    }

    /// Completed moves as `(actor, destination)`, oldest first
    pub fn relocations(&self) -> Vec<(ActorId, Coordinate)> {
        self.state
            .read()
            .events
            .iter()
            .filter_map(|event| match event {
                WorldEvent::Moved { actor, to, .. } => Some((*actor, *to)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: WorldEvent) {
        self.state.write().events.push(event);
    }
}

impl WorldView for SimulatedWorld {
    fn origin(&self) -> BlockPos {
        self.state.read().origin
    }

    fn actor(&self, id: &ActorId) -> Option<ActorSnapshot> {
        self.state.read().actors.get(id).cloned()
    }

    fn online_actors(&self) -> Vec<ActorSnapshot> {
        self.state.read().actors.values().cloned().collect()
    }

    fn find_wake_position(&self, spawn: &SpawnPoint) -> Option<Coordinate> {
        let state = self.state.read();
        if !state.resting_surfaces.contains(&spawn.block) || state.obstructed.contains(&spawn.block) {
            return None;
        }
        let above = BlockPos::new(spawn.block.x, spawn.block.y + 1, spawn.block.z);
        Some(above.floor_center())
    }

    fn is_region_loaded(&self, block: &BlockPos) -> bool {
        !self.state.read().unloaded.contains(&region_of(block))
    }

    fn is_resting_surface(&self, block: &BlockPos) -> bool {
        self.state.read().resting_surfaces.contains(block)
    }
}

impl WorldMutator for SimulatedWorld {
    fn hold_region(&self, actor: &ActorId, block: &BlockPos) -> WorldResult<()> {
        let region = region_of(block);
        let mut state = self.state.write();
        if state.failing.contains(&region) {
            return Err(WorldError::RegionLoadFailed {
                block: *block,
                reason: "region generation failed".into(),
            });
        }
        state.unloaded.remove(&region);
        state.events.push(WorldEvent::RegionHeld {
            actor: *actor,
            region,
        });
        Ok(())
    }

    fn dismount(&self, actor: &ActorId) {
        if let Some(snapshot) = self.state.write().actors.get_mut(actor) {
            snapshot.riding = false;
        }
        self.record(WorldEvent::Dismounted(*actor));
    }

    fn wake(&self, actor: &ActorId) {
        if let Some(snapshot) = self.state.write().actors.get_mut(actor) {
            snapshot.sleeping = false;
        }
        self.record(WorldEvent::Woke(*actor));
    }

    fn set_position(
        &self,
        actor: &ActorId,
        position: Coordinate,
        facing: Facing,
    ) -> WorldResult<()> {
        let mut state = self.state.write();
        let snapshot = state
            .actors
            .get_mut(actor)
            .ok_or(WorldError::ActorNotFound(*actor))?;

        let from = snapshot.position;
        snapshot.position = position;
        snapshot.facing = facing;
        state.events.push(WorldEvent::Moved {
            actor: *actor,
            from,
            to: position,
            facing,
        });
        Ok(())
    }

    fn halt(&self, actor: &ActorId) {
        self.record(WorldEvent::Halted(*actor));
    }

    fn play_relocation_effects(&self, from: Coordinate, to: Coordinate) {
        self.record(WorldEvent::Effects { from, to });
    }
}
