//! Pending relocation requests

use crate::actor::ActorSnapshot;
use crate::ids::{ActorId, RequestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A relocation negotiation awaiting accept, deny or timeout.
///
/// Names are captured at creation so that messages can still be addressed
/// after either side has gone offline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Identity of this request
    pub id: RequestId,
    /// Actor asking to be moved
    pub requester: ActorId,
    /// Display name of the requester
    pub requester_name: String,
    /// Actor whose resting point is the destination
    pub target: ActorId,
    /// Display name of the target
    pub target_name: String,
    /// When the request was submitted
    pub created_at: DateTime<Utc>,
}

impl PendingRequest {
    /// Create a request between two actors, stamped now
    pub fn new(requester: &ActorSnapshot, target: &ActorSnapshot) -> Self {
        Self {
            id: RequestId::generate(),
            requester: requester.id,
            requester_name: requester.name.clone(),
            target: target.id,
            target_name: target.name.clone(),
            created_at: Utc::now(),
        }
    }

    /// Whether this request is addressed to `target` and, when a filter is
    /// given, was made by `requester`
    pub fn matches(&self, requester: Option<&ActorId>, target: &ActorId) -> bool {
        &self.target == target && requester.map_or(true, |r| &self.requester == r)
    }
}
