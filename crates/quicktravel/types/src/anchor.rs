//! Anchor points
//!
//! Anchors are never stored. They are produced on demand for one
//! authorization check and resolved lazily.

use crate::ids::ActorId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A place whose neighbourhood authorizes a relocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorPoint {
    /// The shared world origin
    WorldOrigin,
    /// The resting point of an actor, online or offline
    RestingPointOf(ActorId),
}

impl AnchorPoint {
    /// The actor whose resting point this is, if any
    pub fn owner(&self) -> Option<&ActorId> {
        match self {
            AnchorPoint::WorldOrigin => None,
            AnchorPoint::RestingPointOf(id) => Some(id),
        }
    }
}

impl fmt::Display for AnchorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorPoint::WorldOrigin => write!(f, "world origin"),
            AnchorPoint::RestingPointOf(id) => write!(f, "resting point of {}", id),
        }
    }
}
