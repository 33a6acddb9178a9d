//! Relocation execution

use quicktravel_types::{ActorId, ActorSnapshot, Coordinate, Facing, FacingPolicy, TravelResult};
use quicktravel_world::WorldMutator;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A completed move
#[derive(Debug, Clone, PartialEq)]
pub struct Relocation {
    /// Who moved
    pub actor: ActorId,
    /// Display name at the time of the move
    pub actor_name: String,
    /// Position before the move
    pub from: Coordinate,
    /// Position after the move
    pub to: Coordinate,
    /// Facing after the move
    pub facing: Facing,
}

impl fmt::Display for Relocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} moved {} -> {}", self.actor_name, self.from, self.to)
    }
}

/// Moves actors. Performs no authorization.
pub struct RelocationExecutor {
    world: Arc<dyn WorldMutator>,
}

impl RelocationExecutor {
    /// Create an executor driving `world`
    pub fn new(world: Arc<dyn WorldMutator>) -> Self {
        Self { world }
    }

    /// Move `actor` to `destination`.
    ///
    /// The destination region is held first; if that fails nothing else
    /// happens and the actor stays put. After that the actor is dismounted,
    /// woken, placed, halted, and the effects are played.
    pub fn execute(
        &self,
        actor: &ActorSnapshot,
        destination: Coordinate,
        facing: FacingPolicy,
    ) -> TravelResult<Relocation> {
        let from = actor.position;

        self.world.hold_region(&actor.id, &destination.block())?;

        if actor.riding {
            debug!(actor = %actor.id, "Dismounting before relocation");
            self.world.dismount(&actor.id);
        }
        if actor.sleeping {
            debug!(actor = %actor.id, "Waking before relocation");
            self.world.wake(&actor.id);
        }

        let facing = facing.apply(actor.facing);
        self.world.set_position(&actor.id, destination, facing)?;
        self.world.halt(&actor.id);
        self.world.play_relocation_effects(from, destination);

        let relocation = Relocation {
            actor: actor.id,
            actor_name: actor.name.clone(),
            from,
            to: destination,
            facing,
        };
        info!(actor = %actor.id, "{}", relocation);
        Ok(relocation)
    }
}
