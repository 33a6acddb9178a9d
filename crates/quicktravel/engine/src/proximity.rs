//! Proximity authorization
//!
//! An actor may relocate when it stands within the radius of any anchor.
//! The predicate is a pure existential over the anchor set; the scan order
//! only decides how early it can stop.

use crate::locator::AnchorLocator;
use quicktravel_types::{ActorSnapshot, AnchorPoint, TravelConfig};
use std::sync::Arc;
use tracing::debug;

/// Decides whether an actor is close enough to an anchor to relocate.
pub struct ProximityAuthorizer {
    locator: Arc<AnchorLocator>,
    radius: f64,
}

impl ProximityAuthorizer {
    /// Create an authorizer with an explicit radius
    pub fn new(locator: Arc<AnchorLocator>, radius: f64) -> Self {
        Self { locator, radius }
    }

    /// Create an authorizer using the configured radius
    pub fn from_config(locator: Arc<AnchorLocator>, config: &TravelConfig) -> Self {
        Self::new(locator, config.proximity_radius)
    }

    /// Authorization radius
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether `actor` may relocate from where it stands.
    ///
    /// The realm check is the caller's job.
    pub fn can_relocate(&self, actor: &ActorSnapshot) -> bool {
        self.authorizing_anchor(actor).is_some()
    }

    /// The first anchor within range of `actor`
    pub fn authorizing_anchor(&self, actor: &ActorSnapshot) -> Option<AnchorPoint> {
        let found = self
            .locator
            .find_anchors(actor)
            .find(|candidate| {
                self.locator
                    .resolve(candidate)
                    .is_some_and(|at| actor.position.is_within(&at, self.radius))
            })
            .map(|candidate| candidate.anchor());

        match &found {
            Some(anchor) => debug!(actor = %actor.id, anchor = %anchor, "Relocation authorized"),
            None => debug!(actor = %actor.id, "No anchor within range"),
        }
        found
    }
}
