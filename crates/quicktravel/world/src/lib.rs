//! # QuickTravel World
//!
//! The relocation core never touches the world directly. Everything it reads
//! or changes goes through the traits in [`traits`]:
//!
//! - [`WorldView`]: positions, the live roster, resting-surface checks
//! - [`WorldMutator`]: the side effects of a relocation
//! - [`RecordStore`]: persisted records of offline actors
//! - [`Notifier`]: messages to actors
//!
//! Reference implementations are provided for development and testing:
//! [`SimulatedWorld`], [`FileRecordStore`], [`InMemoryRecordStore`] and
//! [`RecordingNotifier`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod notifier;
pub mod record;
pub mod simulated;
pub mod traits;

pub use errors::{WorldError, WorldResult};
pub use notifier::RecordingNotifier;
pub use record::{FileRecordStore, InMemoryRecordStore, PersistedRecord};
pub use simulated::{region_of, RegionPos, SimulatedWorld, WorldEvent, REGION_SIZE};
pub use traits::{Notifier, RecordStore, WorldMutator, WorldView};
