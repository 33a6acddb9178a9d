//! # QuickTravel Types
//!
//! Plain data shared by the relocation subsystem.
//!
//! An actor may ask to be moved to a safe place: its own resting point, the
//! world origin, or the resting point of another actor. Moves are only granted
//! near an anchor point, and moves to another actor go through a pending
//! request that the other actor accepts or denies.
//!
//! ## Module Organization
//!
//! - [`ids`]: actor, request and realm identifiers
//! - [`geometry`]: block and continuous coordinates, facing
//! - [`actor`]: snapshots of live actors and their spawn points
//! - [`anchor`]: the anchor points that authorize a relocation
//! - [`request`]: pending relocation requests
//! - [`config`]: radius, timeout and realm settings
//! - [`errors`]: user-facing rejections and collaborator failures
//! - [`messages`]: the message catalogue sent to actors

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod actor;
pub mod anchor;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod ids;
pub mod messages;
pub mod request;

pub use actor::{ActorSnapshot, SpawnPoint};
pub use anchor::AnchorPoint;
pub use config::{TravelConfig, DEFAULT_PROXIMITY_RADIUS, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use errors::{CommandOutcome, TravelError, TravelResult};
pub use geometry::{BlockPos, Coordinate, Facing, FacingPolicy};
pub use ids::{ActorId, Realm, RequestId};
pub use request::PendingRequest;

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for QuickTravel types
    pub use super::actor::{ActorSnapshot, SpawnPoint};
    pub use super::anchor::AnchorPoint;
    pub use super::config::TravelConfig;
    pub use super::errors::{CommandOutcome, TravelError, TravelResult};
    pub use super::geometry::{BlockPos, Coordinate, Facing, FacingPolicy};
    pub use super::ids::{ActorId, Realm, RequestId};
    pub use super::request::PendingRequest;
}
