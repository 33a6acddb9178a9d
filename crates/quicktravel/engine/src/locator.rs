//! Anchor discovery and resting-point resolution
//!
//! A resting point lives in one of two places: on a live actor snapshot, or
//! in the persisted record of an offline actor. Both go through the same
//! validation: the stored block only counts while its region is loaded and
//! it is still a resting surface. An unloaded region is "don't know" and
//! never yields an anchor.

use quicktravel_types::{ActorId, ActorSnapshot, AnchorPoint, BlockPos, Coordinate};
use quicktravel_world::{RecordStore, WorldView};
use std::collections::HashSet;
use std::sync::Arc;
use std::vec;

/// Where a resting point is read from
#[derive(Debug, Clone, Copy)]
pub enum RestingSource<'a> {
    /// A live actor's snapshot
    Online(&'a ActorSnapshot),
    /// An offline actor's persisted record
    Offline(ActorId),
}

impl RestingSource<'_> {
    /// The actor owning the resting point
    pub fn actor_id(&self) -> ActorId {
        match self {
            RestingSource::Online(actor) => actor.id,
            RestingSource::Offline(id) => *id,
        }
    }
}

/// An anchor found by [`AnchorLocator::find_anchors`], not yet resolved
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorCandidate {
    /// The world origin
    Origin,
    /// The resting point of an online actor
    Online(ActorSnapshot),
    /// The resting point of an actor known only from its record
    Offline(ActorId),
}

impl AnchorCandidate {
    /// The anchor this candidate stands for
    pub fn anchor(&self) -> AnchorPoint {
        match self {
            AnchorCandidate::Origin => AnchorPoint::WorldOrigin,
            AnchorCandidate::Online(actor) => AnchorPoint::RestingPointOf(actor.id),
            AnchorCandidate::Offline(id) => AnchorPoint::RestingPointOf(*id),
        }
    }
}

/// Finds and resolves anchor points. Read-only.
pub struct AnchorLocator {
    world: Arc<dyn WorldView>,
    records: Arc<dyn RecordStore>,
}

impl AnchorLocator {
    /// Create a locator over a world and a record store
    pub fn new(world: Arc<dyn WorldView>, records: Arc<dyn RecordStore>) -> Self {
        Self { world, records }
    }

    /// Anchor coordinate of the world origin
    pub fn origin(&self) -> Coordinate {
        self.world.origin().center()
    }

    /// Where an actor sent to the world origin arrives
    pub fn origin_destination(&self) -> Coordinate {
        self.world.origin().floor_center()
    }

    /// Where `actor` would wake up at its resting point.
    ///
    /// `None` when no resting point is set or the world reports it obstructed.
    pub fn resting_point_of(&self, actor: &ActorSnapshot) -> Option<Coordinate> {
        let spawn = actor.spawn.as_ref()?;
        self.world.find_wake_position(spawn)
    }

    /// The validated resting point stored in an offline actor's record,
    /// as the centre of its block
    pub fn resting_point_from_record(&self, id: &ActorId) -> Option<Coordinate> {
        self.resting_block(RestingSource::Offline(*id))
            .map(|block| block.center())
    }

    /// The stored resting block of `source`, if it still checks out
    pub fn resting_block(&self, source: RestingSource<'_>) -> Option<BlockPos> {
        let block = match source {
            RestingSource::Online(actor) => actor.spawn?.block,
            RestingSource::Offline(id) => self.records.load_record(&id)?,
        };

        if self.world.is_region_loaded(&block) && self.world.is_resting_surface(&block) {
            Some(block)
        } else {
            None
        }
    }

    /// Every anchor that could authorize `actor`, cheapest first.
    ///
    /// Order: world origin, the actor's own resting point, other online
    /// actors, then actors with persisted records. Each actor appears once.
    pub fn find_anchors<'a>(&'a self, actor: &'a ActorSnapshot) -> AnchorScan<'a> {
        AnchorScan {
            locator: self,
            actor,
            stage: ScanStage::Origin,
            seen: HashSet::new(),
            online: None,
            offline: None,
        }
    }

    /// Coordinate of a discovered anchor
    pub fn resolve(&self, candidate: &AnchorCandidate) -> Option<Coordinate> {
        let block = match candidate {
            AnchorCandidate::Origin => return Some(self.origin()),
            AnchorCandidate::Online(actor) => self.resting_block(RestingSource::Online(actor)),
            AnchorCandidate::Offline(id) => self.resting_block(RestingSource::Offline(*id)),
        };
        block.map(|b| b.center())
    }

    /// Coordinate of an anchor given only its identity
    pub fn resolve_anchor(&self, anchor: &AnchorPoint) -> Option<Coordinate> {
        match anchor {
            AnchorPoint::WorldOrigin => Some(self.origin()),
            AnchorPoint::RestingPointOf(id) => {
                let block = match self.world.actor(id) {
                    Some(actor) => self.resting_block(RestingSource::Online(&actor)),
                    None => self.resting_block(RestingSource::Offline(*id)),
                };
                block.map(|b| b.center())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanStage {
    Origin,
    Own,
    Online,
    Offline,
    Done,
}

/// Lazy walk over the anchors of one actor.
///
/// The roster and the record listing are only fetched once the walk reaches
/// them, so a caller that stops early never pays for them.
pub struct AnchorScan<'a> {
    locator: &'a AnchorLocator,
    actor: &'a ActorSnapshot,
    stage: ScanStage,
    seen: HashSet<ActorId>,
    online: Option<vec::IntoIter<ActorSnapshot>>,
    offline: Option<vec::IntoIter<ActorId>>,
}

impl Iterator for AnchorScan<'_> {
    type Item = AnchorCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stage {
                ScanStage::Origin => {
                    self.stage = ScanStage::Own;
                    return Some(AnchorCandidate::Origin);
                }
                ScanStage::Own => {
                    self.stage = ScanStage::Online;
                    self.seen.insert(self.actor.id);
                    return Some(AnchorCandidate::Online(self.actor.clone()));
                }
                ScanStage::Online => {
                    let world = &self.locator.world;
                    let online = self
                        .online
                        .get_or_insert_with(|| world.online_actors().into_iter());
                    let seen = &mut self.seen;
                    match online.find(|other| seen.insert(other.id)) {
                        Some(other) => return Some(AnchorCandidate::Online(other)),
                        None => self.stage = ScanStage::Offline,
                    }
                }
                ScanStage::Offline => {
                    let records = &self.locator.records;
                    let offline = self
                        .offline
                        .get_or_insert_with(|| records.saved_actor_ids().into_iter());
                    let seen = &mut self.seen;
                    match offline.find(|id| seen.insert(*id)) {
                        Some(id) => return Some(AnchorCandidate::Offline(id)),
                        None => self.stage = ScanStage::Done,
                    }
                }
                ScanStage::Done => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicktravel_types::SpawnPoint;
    use quicktravel_world::{InMemoryRecordStore, SimulatedWorld};

    struct Fixture {
        world: Arc<SimulatedWorld>,
        records: Arc<InMemoryRecordStore>,
        locator: AnchorLocator,
    }

    fn fixture() -> Fixture {
        let world = Arc::new(SimulatedWorld::new());
        let records = Arc::new(InMemoryRecordStore::new());
        let locator = AnchorLocator::new(world.clone(), records.clone());
        Fixture {
            world,
            records,
            locator,
        }
    }

    fn actor_at(name: &str, x: f64) -> ActorSnapshot {
        ActorSnapshot::new(ActorId::generate(), name, Coordinate::new(x, 64.0, 0.0))
    }

    #[test]
    fn resting_point_of_without_spawn_is_none() {
        let f = fixture();
        assert_eq!(f.locator.resting_point_of(&actor_at("X", 0.0)), None);
    }

    #[test]
    fn resting_point_of_uses_wake_position() {
        let f = fixture();
        let bed = BlockPos::new(40, 64, 0);
        f.world.add_resting_surface(bed);
        let actor = actor_at("X", 0.0).with_spawn(SpawnPoint::new(bed, 0.0));

        assert_eq!(
            f.locator.resting_point_of(&actor),
            Some(Coordinate::new(40.5, 65.0, 0.5))
        );

        f.world.obstruct(bed);
        assert_eq!(f.locator.resting_point_of(&actor), None);
    }

    #[test]
    fn record_in_unloaded_region_is_not_trusted() {
        let f = fixture();
        let id = ActorId::generate();
        let bed = BlockPos::new(500, 64, 500);
        f.world.add_resting_surface(bed);
        f.records.insert_spawn(id, bed);
        assert_eq!(
            f.locator.resting_point_from_record(&id),
            Some(Coordinate::new(500.5, 64.5, 500.5))
        );

        f.world.unload_region(&bed);
        assert_eq!(f.locator.resting_point_from_record(&id), None);
    }

    #[test]
    fn record_without_resting_surface_is_none() {
        let f = fixture();
        let id = ActorId::generate();
        f.records.insert_spawn(id, BlockPos::new(3, 64, 3));
        assert_eq!(f.locator.resting_point_from_record(&id), None);
    }

    #[test]
    fn missing_record_is_none() {
        let f = fixture();
        assert_eq!(f.locator.resting_point_from_record(&ActorId::generate()), None);
    }

    #[test]
    fn scan_order_and_dedup() {
        let f = fixture();
        let me = actor_at("Me", 0.0);
        let other = actor_at("Other", 10.0);
        let offline = ActorId::generate();

        f.world.add_actor(me.clone());
        f.world.add_actor(other.clone());
        // Online actors also have records on disk.
        f.records.insert_spawn(me.id, BlockPos::new(0, 0, 0));
        f.records.insert_spawn(other.id, BlockPos::new(0, 0, 0));
        f.records.insert_spawn(offline, BlockPos::new(0, 0, 0));

        let anchors: Vec<AnchorPoint> = f.locator.find_anchors(&me).map(|c| c.anchor()).collect();

        assert_eq!(
            anchors,
            vec![
                AnchorPoint::WorldOrigin,
                AnchorPoint::RestingPointOf(me.id),
                AnchorPoint::RestingPointOf(other.id),
                AnchorPoint::RestingPointOf(offline),
            ]
        );
    }

    #[test]
    fn resolve_anchor_prefers_live_snapshot() {
        let f = fixture();
        let live_bed = BlockPos::new(8, 64, 8);
        let stale_bed = BlockPos::new(-8, 64, -8);
        f.world.add_resting_surface(live_bed);
        f.world.add_resting_surface(stale_bed);

        let actor = actor_at("X", 0.0).with_spawn(SpawnPoint::new(live_bed, 0.0));
        f.world.add_actor(actor.clone());
        f.records.insert_spawn(actor.id, stale_bed);

        assert_eq!(
            f.locator.resolve_anchor(&AnchorPoint::RestingPointOf(actor.id)),
            Some(live_bed.center())
        );

        f.world.remove_actor(&actor.id);
        assert_eq!(
            f.locator.resolve_anchor(&AnchorPoint::RestingPointOf(actor.id)),
            Some(stale_bed.center())
        );
    }

    #[test]
    fn origin_coordinates() {
        let world = Arc::new(SimulatedWorld::new().with_origin(BlockPos::new(100, 70, -20)));
        let locator = AnchorLocator::new(world, Arc::new(InMemoryRecordStore::new()));

        assert_eq!(locator.origin(), Coordinate::new(100.5, 70.5, -19.5));
        assert_eq!(locator.origin_destination(), Coordinate::new(100.5, 70.0, -19.5));
        assert_eq!(locator.resolve_anchor(&AnchorPoint::WorldOrigin), Some(locator.origin()));
    }
}
