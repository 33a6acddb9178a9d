//! Error types for world collaborators

use quicktravel_types::{ActorId, BlockPos, TravelError};
use thiserror::Error;

/// Failures reported by a world collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    /// The region holding `block` could not be loaded
    #[error("region at {block} failed to load: {reason}")]
    RegionLoadFailed {
        /// Block whose region was requested
        block: BlockPos,
        /// Why loading failed
        reason: String,
    },

    /// The actor is no longer present in the world
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// Any other collaborator failure
    #[error("world unavailable: {0}")]
    Unavailable(String),
}

impl From<WorldError> for TravelError {
    fn from(e: WorldError) -> Self {
        match e {
            WorldError::RegionLoadFailed { .. } => TravelError::RegionLoad(e.to_string()),
            WorldError::ActorNotFound(id) => TravelError::UnknownActor(id),
            WorldError::Unavailable(reason) => TravelError::Collaborator(reason),
        }
    }
}

/// Result type for collaborator calls
pub type WorldResult<T> = Result<T, WorldError>;
