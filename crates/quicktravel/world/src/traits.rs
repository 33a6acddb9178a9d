//! Collaborator seams

use crate::errors::WorldResult;
use quicktravel_types::{ActorId, ActorSnapshot, BlockPos, Coordinate, Facing, SpawnPoint};

/// Read access to the world.
///
/// Implementations may block on I/O; callers invoke them on their own thread.
pub trait WorldView: Send + Sync {
    /// The block at the shared world origin
    fn origin(&self) -> BlockPos;

    /// Snapshot of an online actor, `None` when offline
    fn actor(&self, id: &ActorId) -> Option<ActorSnapshot>;

    /// Snapshots of every online actor
    fn online_actors(&self) -> Vec<ActorSnapshot>;

    /// Where an actor resting at `spawn` would wake up.
    ///
    /// `None` when the resting block is gone or every adjacent spot is
    /// obstructed.
    fn find_wake_position(&self, spawn: &SpawnPoint) -> Option<Coordinate>;

    /// Whether the region containing `block` is currently loaded
    fn is_region_loaded(&self, block: &BlockPos) -> bool;

    /// Whether `block` is still something an actor can rest on
    fn is_resting_surface(&self, block: &BlockPos) -> bool;
}

/// The side effects of moving an actor.
pub trait WorldMutator: Send + Sync {
    /// Load the region around `block` and keep it loaded for `actor`'s arrival
    fn hold_region(&self, actor: &ActorId, block: &BlockPos) -> WorldResult<()>;

    /// Release whatever the actor is riding
    fn dismount(&self, actor: &ActorId);

    /// Get the actor out of its resting state
    fn wake(&self, actor: &ActorId);

    /// Place the actor
    fn set_position(&self, actor: &ActorId, position: Coordinate, facing: Facing)
        -> WorldResult<()>;

    /// Zero residual velocity and mark the actor grounded
    fn halt(&self, actor: &ActorId);

    /// Departure and arrival feedback
    fn play_relocation_effects(&self, from: Coordinate, to: Coordinate);
}

/// Persisted records of actors, including offline ones.
///
/// Every failure is a miss: implementations never propagate errors.
pub trait RecordStore: Send + Sync {
    /// IDs of every actor with a saved record
    fn saved_actor_ids(&self) -> Vec<ActorId>;

    /// The resting block stored in an actor's record
    fn load_record(&self, id: &ActorId) -> Option<BlockPos>;
}

/// Delivers messages to actors.
pub trait Notifier: Send + Sync {
    /// Send `message` to `actor`; silently dropped if the actor is offline
    fn notify(&self, actor: &ActorId, message: &str);
}
