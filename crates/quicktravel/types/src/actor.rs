//! Actor snapshots
//!
//! The world owns actors; this crate only sees point-in-time copies of the
//! attributes the relocation rules read.

use crate::geometry::{BlockPos, Coordinate, Facing};
use crate::ids::{ActorId, Realm};
use serde::{Deserialize, Serialize};

/// A stored resting point: the block the actor last slept on and the angle
/// it was set with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// The resting block
    pub block: BlockPos,
    /// Orientation recorded with the resting point
    pub angle: f32,
}

impl SpawnPoint {
    /// Create a spawn point
    pub fn new(block: BlockPos, angle: f32) -> Self {
        Self { block, angle }
    }
}

/// A live actor as seen at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Stable identity
    pub id: ActorId,
    /// Display name
    pub name: String,
    /// Realm the actor currently occupies
    pub realm: Realm,
    /// Current position
    pub position: Coordinate,
    /// Current facing
    pub facing: Facing,
    /// Stored resting point, unvalidated
    pub spawn: Option<SpawnPoint>,
    /// Whether the actor is lying in a resting spot
    pub sleeping: bool,
    /// Whether the actor is riding something
    pub riding: bool,
}

impl ActorSnapshot {
    /// Create an idle actor in the primary world with no resting point
    pub fn new(id: ActorId, name: impl Into<String>, position: Coordinate) -> Self {
        Self {
            id,
            name: name.into(),
            realm: Realm::overworld(),
            position,
            facing: Facing::default(),
            spawn: None,
            sleeping: false,
            riding: false,
        }
    }

    /// Set the realm
    pub fn in_realm(mut self, realm: Realm) -> Self {
        self.realm = realm;
        self
    }

    /// Set the stored resting point
    pub fn with_spawn(mut self, spawn: SpawnPoint) -> Self {
        self.spawn = Some(spawn);
        self
    }

    /// Set the facing
    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Whether the actor occupies `realm`
    pub fn is_in(&self, realm: &Realm) -> bool {
        &self.realm == realm
    }
}
