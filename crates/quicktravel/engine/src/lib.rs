//! # QuickTravel Engine
//!
//! Relocation of actors to safe places, gated by proximity.
//!
//! ## Components
//!
//! - [`AnchorLocator`]: finds anchor points (world origin, resting points of
//!   online and offline actors) and resolves them to coordinates
//! - [`ProximityAuthorizer`]: grants a relocation when the actor stands within
//!   the configured radius of any anchor
//! - [`RequestRegistry`]: pending requests between actors, one per requester,
//!   removed exactly once by an answer or by timeout
//! - [`RelocationExecutor`]: performs a move and its side effects
//! - [`TravelService`]: the command entry points used by a front end
//!
//! ## Example
//!
//! ```rust,ignore
//! use quicktravel_engine::TravelService;
//! use quicktravel_types::{CommandOutcome, TravelConfig};
//!
//! let service = TravelService::new(config, world.clone(), world, records, notifier)?;
//! let outcome: CommandOutcome = service.go_to_origin(&actor).into();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod executor;
pub mod locator;
pub mod proximity;
pub mod registry;
pub mod service;

pub use executor::{Relocation, RelocationExecutor};
pub use locator::{AnchorCandidate, AnchorLocator, AnchorScan, RestingSource};
pub use proximity::ProximityAuthorizer;
pub use registry::{RequestRegistry, TimeoutCallback};
pub use service::{AcceptReport, DenyReport, RequestReceipt, TravelService};
