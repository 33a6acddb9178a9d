//! Command entry points
//!
//! One method per user-facing verb. Every method resolves its calling actor
//! from the live roster first, so commands from actors that went offline
//! fail with [`TravelError::UnknownActor`].

use crate::executor::{Relocation, RelocationExecutor};
use crate::locator::AnchorLocator;
use crate::proximity::ProximityAuthorizer;
use crate::registry::RequestRegistry;
use quicktravel_types::{
    messages, ActorId, ActorSnapshot, Coordinate, FacingPolicy, PendingRequest, TravelConfig,
    TravelError, TravelResult,
};
use quicktravel_world::{
    FileRecordStore, InMemoryRecordStore, Notifier, RecordStore, WorldMutator, WorldView,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A registered relocation request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestReceipt {
    /// The request as stored
    pub request: PendingRequest,
    /// When it expires unanswered, in seconds
    pub timeout_secs: u64,
}

impl fmt::Display for RequestReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&messages::request_sent(&self.request.target_name))
    }
}

/// Result of accepting a batch of requests.
///
/// Each requester succeeds or fails on its own.
#[derive(Debug, Default)]
pub struct AcceptReport {
    /// Requesters that were moved
    pub relocated: Vec<Relocation>,
    /// Requesters that could not be moved, with the reason
    pub failed: Vec<(PendingRequest, TravelError)>,
}

impl AcceptReport {
    /// Number of requests that were answered
    pub fn total(&self) -> usize {
        self.relocated.len() + self.failed.len()
    }
}

impl fmt::Display for AcceptReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total() == 0 {
            return f.write_str("There are no teleport requests to accept.");
        }
        write!(
            f,
            "Accepted {} teleport request(s), {} failed.",
            self.relocated.len(),
            self.failed.len()
        )
    }
}

/// Result of denying requests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenyReport {
    /// The requests that were denied
    pub denied: Vec<PendingRequest>,
}

impl fmt::Display for DenyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denied.is_empty() {
            f.write_str("There are no teleport requests to deny.")
        } else {
            write!(f, "Denied {} teleport request(s).", self.denied.len())
        }
    }
}

/// The relocation subsystem behind the front end.
pub struct TravelService {
    config: TravelConfig,
    world: Arc<dyn WorldView>,
    locator: Arc<AnchorLocator>,
    authorizer: ProximityAuthorizer,
    registry: RequestRegistry,
    executor: RelocationExecutor,
    notifier: Arc<dyn Notifier>,
}

impl TravelService {
    /// Wire a service from its collaborators
    pub fn new(
        config: TravelConfig,
        world: Arc<dyn WorldView>,
        mutator: Arc<dyn WorldMutator>,
        records: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
    ) -> TravelResult<Self> {
        config.validate()?;

        let locator = Arc::new(AnchorLocator::new(world.clone(), records));
        let authorizer = ProximityAuthorizer::from_config(locator.clone(), &config);
        let registry = RequestRegistry::from_config(&config)?;

        info!(
            radius = config.proximity_radius,
            timeout_secs = config.request_timeout_secs,
            realm = %config.home_realm,
            "Travel service ready"
        );

        Ok(Self {
            config,
            world,
            locator,
            authorizer,
            registry,
            executor: RelocationExecutor::new(mutator),
            notifier,
        })
    }

    /// Wire a service whose records come from `config.record_dir`.
    ///
    /// Without a record directory no offline actor is known.
    pub fn from_config(
        config: TravelConfig,
        world: Arc<dyn WorldView>,
        mutator: Arc<dyn WorldMutator>,
        notifier: Arc<dyn Notifier>,
    ) -> TravelResult<Self> {
        let records: Arc<dyn RecordStore> = match &config.record_dir {
            Some(dir) => Arc::new(FileRecordStore::new(dir.clone())),
            None => Arc::new(InMemoryRecordStore::new()),
        };
        Self::new(config, world, mutator, records, notifier)
    }

    /// Active configuration
    pub fn config(&self) -> &TravelConfig {
        &self.config
    }

    /// The anchor locator
    pub fn locator(&self) -> &AnchorLocator {
        &self.locator
    }

    /// The proximity authorizer
    pub fn authorizer(&self) -> &ProximityAuthorizer {
        &self.authorizer
    }

    /// Pending requests
    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    /// Move `actor` to its own resting point
    pub fn go_home(&self, actor: &ActorId) -> TravelResult<Relocation> {
        let actor = self.online(actor)?;
        self.ensure_authorized(&actor)?;

        let destination = self
            .locator
            .resting_point_of(&actor)
            .ok_or(TravelError::NoRestingPoint)?;
        self.executor.execute(&actor, destination, FacingPolicy::Reset)
    }

    /// Move `actor` to the world origin
    pub fn go_to_origin(&self, actor: &ActorId) -> TravelResult<Relocation> {
        let actor = self.online(actor)?;
        self.ensure_authorized(&actor)?;

        let destination = self.locator.origin_destination();
        self.executor.execute(&actor, destination, FacingPolicy::Reset)
    }

    /// Ask `target` to let `requester` come to its resting point.
    pub fn request_relocation(
        &self,
        requester: &ActorId,
        target: &ActorId,
    ) -> TravelResult<RequestReceipt> {
        let requester = self.online(requester)?;
        let target = self.online(target)?;
        self.ensure_authorized(&requester)?;

        if self.locator.resting_point_of(&target).is_none() {
            return Err(TravelError::TargetNoRestingPoint {
                name: target.name.clone(),
            });
        }

        let request = PendingRequest::new(&requester, &target);
        let notifier = self.notifier.clone();
        let created = self.registry.create(request.clone(), move |expired| {
            notifier.notify(
                &expired.requester,
                &messages::request_timed_out(&expired.target_name),
            );
        });
        if !created {
            return Err(TravelError::AlreadyPending);
        }

        self.notifier.notify(
            &target.id,
            &messages::request_prompt(&requester.name, self.config.request_timeout_secs),
        );

        Ok(RequestReceipt {
            request,
            timeout_secs: self.config.request_timeout_secs,
        })
    }

    /// Accept the requests waiting on `target`, or only the one from
    /// `requester` when given.
    ///
    /// Matched requests are consumed before anything else is checked. If the
    /// target has no usable resting point every matched requester is told so
    /// and the command fails. Otherwise each requester is re-checked and
    /// moved on its own.
    pub fn accept_relocation(
        &self,
        target: &ActorId,
        requester: Option<&ActorId>,
    ) -> TravelResult<AcceptReport> {
        let target = self.online(target)?;
        let requests = self.registry.resolve(requester, &target.id);

        let Some(destination) = self.locator.resting_point_of(&target) else {
            let reason = TravelError::TargetNoRestingPoint {
                name: target.name.clone(),
            }
            .to_string();
            for request in &requests {
                self.notifier.notify(
                    &request.requester,
                    &messages::request_failed(&target.name, &reason),
                );
            }
            return Err(TravelError::NoRestingPoint);
        };

        let mut report = AcceptReport::default();
        for request in requests {
            match self.relocate_requester(&request, destination) {
                Ok(relocation) => {
                    self.notifier.notify(
                        &request.requester,
                        &messages::request_accepted(&target.name),
                    );
                    report.relocated.push(relocation);
                }
                Err(e) => {
                    debug!(request = %request.id, requester = %request.requester, error = %e, "Accepted request failed");
                    self.notifier.notify(
                        &request.requester,
                        &messages::request_failed(&target.name, &e.to_string()),
                    );
                    report.failed.push((request, e));
                }
            }
        }
        Ok(report)
    }

    fn relocate_requester(
        &self,
        request: &PendingRequest,
        destination: Coordinate,
    ) -> TravelResult<Relocation> {
        let requester = self.online(&request.requester)?;
        self.ensure_authorized(&requester)?;
        self.executor
            .execute(&requester, destination, FacingPolicy::Preserve)
    }

    /// Deny the requests waiting on `target`, or only the one from
    /// `requester` when given. Nobody waiting is not a failure.
    pub fn deny_relocation(
        &self,
        target: &ActorId,
        requester: Option<&ActorId>,
    ) -> TravelResult<DenyReport> {
        let target = self.online(target)?;
        let denied = self.registry.resolve(requester, &target.id);
        for request in &denied {
            self.notifier.notify(
                &request.requester,
                &messages::request_denied(&target.name),
            );
        }
        Ok(DenyReport { denied })
    }

    /// Names of the actors waiting on `target`, for input completion
    pub fn suggest_response_targets(&self, target: &ActorId) -> Vec<String> {
        self.registry.suggest_requesters(target)
    }

    fn online(&self, id: &ActorId) -> TravelResult<ActorSnapshot> {
        self.world.actor(id).ok_or(TravelError::UnknownActor(*id))
    }

    fn ensure_home_realm(&self, actor: &ActorSnapshot) -> TravelResult<()> {
        if actor.is_in(&self.config.home_realm) {
            Ok(())
        } else {
            Err(TravelError::WrongRealm(self.config.home_realm.clone()))
        }
    }

    fn ensure_authorized(&self, actor: &ActorSnapshot) -> TravelResult<()> {
        self.ensure_home_realm(actor)?;
        if self.authorizer.can_relocate(actor) {
            Ok(())
        } else {
            Err(TravelError::TooFarAway)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicktravel_types::{BlockPos, CommandOutcome, Realm, SpawnPoint};
    use quicktravel_world::{RecordingNotifier, SimulatedWorld};

    struct Fixture {
        world: Arc<SimulatedWorld>,
        notifier: Arc<RecordingNotifier>,
        service: TravelService,
    }

    fn fixture() -> Fixture {
        let world = Arc::new(SimulatedWorld::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = TravelService::new(
            TravelConfig::default(),
            world.clone(),
            world.clone(),
            Arc::new(InMemoryRecordStore::new()),
            notifier.clone(),
        )
        .unwrap();
        Fixture {
            world,
            notifier,
            service,
        }
    }

    fn spawn_actor(world: &SimulatedWorld, name: &str, at: Coordinate) -> ActorSnapshot {
        let actor = ActorSnapshot::new(ActorId::generate(), name, at);
        world.add_actor(actor.clone());
        actor
    }

    fn give_bed(world: &SimulatedWorld, actor: &ActorSnapshot, bed: BlockPos) -> ActorSnapshot {
        world.add_resting_surface(bed);
        let actor = actor.clone().with_spawn(SpawnPoint::new(bed, 0.0));
        world.add_actor(actor.clone());
        actor
    }

    #[test]
    fn invalid_config_is_rejected() {
        let world = Arc::new(SimulatedWorld::new());
        let config = TravelConfig {
            proximity_radius: -1.0,
            ..TravelConfig::default()
        };
        let result = TravelService::new(
            config,
            world.clone(),
            world,
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(RecordingNotifier::new()),
        );
        assert!(matches!(result, Err(TravelError::Config(_))));
    }

    #[test]
    fn offline_caller_is_unknown() {
        let f = fixture();
        let ghost = ActorId::generate();
        assert!(matches!(
            f.service.go_to_origin(&ghost),
            Err(TravelError::UnknownActor(id)) if id == ghost
        ));
    }

    #[test]
    fn wrong_realm_is_checked_before_distance() {
        let f = fixture();
        let actor = ActorSnapshot::new(ActorId::generate(), "Alex", Coordinate::ORIGIN)
            .in_realm(Realm::new("nether"));
        f.world.add_actor(actor.clone());

        let err = f.service.go_to_origin(&actor.id).unwrap_err();
        assert_eq!(
            err.to_string(),
            "This command can only be used in the overworld."
        );
    }

    #[test]
    fn go_to_origin_lands_on_block_floor_with_reset_facing() {
        let f = fixture();
        let actor = spawn_actor(&f.world, "Alex", Coordinate::new(10.0, 0.0, 10.0));

        let relocation = f.service.go_to_origin(&actor.id).unwrap();
        assert_eq!(relocation.to, Coordinate::new(0.5, 0.0, 0.5));
        assert_eq!(relocation.facing, quicktravel_types::Facing::CANONICAL);
    }

    #[test]
    fn go_to_origin_far_away_is_refused() {
        let f = fixture();
        let actor = spawn_actor(&f.world, "Alex", Coordinate::new(300.0, 64.0, 300.0));

        let outcome: CommandOutcome = f.service.go_to_origin(&actor.id).into();
        assert_eq!(
            outcome,
            CommandOutcome::failure("You are too far away from a bed or world spawn.")
        );
        assert!(f.world.relocations().is_empty());
    }

    #[test]
    fn go_home_with_obstructed_bed_fails() {
        let f = fixture();
        let actor = spawn_actor(&f.world, "Alex", Coordinate::new(1.0, 0.0, 1.0));
        let bed = BlockPos::new(400, 64, 0);
        let actor = give_bed(&f.world, &actor, bed);
        f.world.obstruct(bed);

        assert!(matches!(
            f.service.go_home(&actor.id),
            Err(TravelError::NoRestingPoint)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn request_to_actor_without_bed_fails() {
        let f = fixture();
        let x = spawn_actor(&f.world, "X", Coordinate::ORIGIN);
        let y = spawn_actor(&f.world, "Steve", Coordinate::new(900.0, 64.0, 0.0));

        let err = f.service.request_relocation(&x.id, &y.id).unwrap_err();
        assert_eq!(err.to_string(), "Steve has no home bed or it was obstructed.");
        assert!(f.service.registry().is_empty());
        assert!(f.notifier.all().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_request_is_refused() {
        let f = fixture();
        let x = spawn_actor(&f.world, "X", Coordinate::ORIGIN);
        let y = spawn_actor(&f.world, "Y", Coordinate::new(900.0, 64.0, 0.0));
        let z = spawn_actor(&f.world, "Z", Coordinate::new(-900.0, 64.0, 0.0));
        give_bed(&f.world, &y, BlockPos::new(900, 64, 0));
        give_bed(&f.world, &z, BlockPos::new(-900, 64, 0));

        let receipt = f.service.request_relocation(&x.id, &y.id).unwrap();
        assert_eq!(receipt.to_string(), "Teleport to Y has been requested.");

        assert!(matches!(
            f.service.request_relocation(&x.id, &z.id),
            Err(TravelError::AlreadyPending)
        ));
        assert_eq!(f.service.registry().pending_for(&x.id), Some(receipt.request));
        assert!(f.notifier.messages_for(&z.id).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn accept_without_bed_fails_every_requester() {
        let f = fixture();
        let y = spawn_actor(&f.world, "Y", Coordinate::new(900.0, 64.0, 0.0));
        let bed = BlockPos::new(900, 64, 0);
        give_bed(&f.world, &y, bed);
        let a = spawn_actor(&f.world, "A", Coordinate::ORIGIN);
        let b = spawn_actor(&f.world, "B", Coordinate::new(2.0, 0.0, 2.0));

        f.service.request_relocation(&a.id, &y.id).unwrap();
        f.service.request_relocation(&b.id, &y.id).unwrap();
        f.world.remove_resting_surface(&bed);

        let err = f.service.accept_relocation(&y.id, None).unwrap_err();
        assert!(matches!(err, TravelError::NoRestingPoint));
        assert!(f.service.registry().is_empty());
        for requester in [&a, &b] {
            assert_eq!(
                f.notifier.messages_for(&requester.id),
                vec!["Teleport to Y has failed: Y has no home bed or it was obstructed.".to_string()]
            );
        }
        assert!(f.world.relocations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn accept_with_nobody_waiting_succeeds() {
        let f = fixture();
        let y = spawn_actor(&f.world, "Y", Coordinate::ORIGIN);
        give_bed(&f.world, &y, BlockPos::new(5, 0, 5));

        let report = f.service.accept_relocation(&y.id, None).unwrap();
        assert_eq!(report.total(), 0);
        assert_eq!(report.to_string(), "There are no teleport requests to accept.");
    }

    #[tokio::test(start_paused = true)]
    async fn peer_relocation_preserves_facing() {
        let f = fixture();
        let y = spawn_actor(&f.world, "Y", Coordinate::new(900.0, 64.0, 0.0));
        give_bed(&f.world, &y, BlockPos::new(900, 64, 0));
        let facing = quicktravel_types::Facing::new(120.0, -15.0);
        let x = ActorSnapshot::new(ActorId::generate(), "X", Coordinate::ORIGIN).facing(facing);
        f.world.add_actor(x.clone());

        f.service.request_relocation(&x.id, &y.id).unwrap();
        let report = f.service.accept_relocation(&y.id, Some(&x.id)).unwrap();

        assert_eq!(report.relocated.len(), 1);
        assert_eq!(report.relocated[0].facing, facing);
        assert_eq!(report.relocated[0].to, Coordinate::new(900.5, 65.0, 0.5));
    }

    #[tokio::test(start_paused = true)]
    async fn deny_with_nobody_waiting_succeeds() {
        let f = fixture();
        let y = spawn_actor(&f.world, "Y", Coordinate::ORIGIN);

        let report = f.service.deny_relocation(&y.id, None).unwrap();
        assert!(report.denied.is_empty());
        assert_eq!(report.to_string(), "There are no teleport requests to deny.");
    }
}
