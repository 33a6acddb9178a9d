//! Error types for relocation commands
//!
//! Most variants are ordinary rejections of user input. Their display text
//! is the message shown to the actor, so it must stay stable.

use crate::ids::{ActorId, Realm};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can end a relocation command
#[derive(Error, Debug)]
pub enum TravelError {
    /// Actor is outside the realm where relocation works
    #[error("This command can only be used in the {0}.")]
    WrongRealm(Realm),

    /// No anchor point lies within the authorization radius
    #[error("You are too far away from a bed or world spawn.")]
    TooFarAway,

    /// Actor has no usable resting point
    #[error("You have no home bed or it was obstructed.")]
    NoRestingPoint,

    /// The requested destination actor has no usable resting point
    #[error("{name} has no home bed or it was obstructed.")]
    TargetNoRestingPoint {
        /// Display name of the target
        name: String,
    },

    /// Requester already waits on an answer
    #[error("You already have a teleport request pending.")]
    AlreadyPending,

    /// Actor is not online
    #[error("Actor {0} is not online.")]
    UnknownActor(ActorId),

    /// The world could not load the destination region
    #[error("The destination could not be loaded: {0}")]
    RegionLoad(String),

    /// A world collaborator failed while carrying out a relocation
    #[error("The relocation could not be completed: {0}")]
    Collaborator(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O failure reading configuration
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TravelError {
    /// Whether this is a normal rejection of what the actor asked for,
    /// rather than a failure of the system
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            Self::WrongRealm(_)
                | Self::TooFarAway
                | Self::NoRestingPoint
                | Self::TargetNoRestingPoint { .. }
                | Self::AlreadyPending
        )
    }
}

/// Result type for relocation commands
pub type TravelResult<T> = Result<T, TravelError>;

/// What the front end shows after a command
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Whether the command did what was asked
    pub success: bool,
    /// Message for the calling actor
    pub message: String,
}

impl CommandOutcome {
    /// A successful outcome
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failed outcome
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl<T: fmt::Display> From<TravelResult<T>> for CommandOutcome {
    fn from(result: TravelResult<T>) -> Self {
        match result {
            Ok(value) => Self::success(value.to_string()),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
