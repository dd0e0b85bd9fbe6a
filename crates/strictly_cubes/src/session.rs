//! Match management.
//!
//! A [`Match`] owns the one "current" state of a game together with its
//! notification bus. Every change flows through `&mut self`, so a request is
//! fully applied and published before the next one is accepted.

use crate::events::{ChangeType, ErrorKind, EventKind, GameEvent, NotificationBus, Subscription};
use crate::games::cubes::action::{MoveError, MoveRequest};
use crate::games::cubes::chain::ChainReaction;
use crate::games::cubes::contracts::{Contract, MoveContract, apply_audited};
use crate::games::cubes::engine::{Transition, apply_move};
use crate::games::cubes::geometry::Point;
use crate::games::cubes::invariants::{ValidationReport, validate_state};
use crate::games::cubes::rules::validate_move;
use crate::games::cubes::sync::{
    RemoteMessage, SnapshotPayload, SyncError, SyncOutcome, Synchronizer,
};
use crate::games::cubes::types::{GameMode, GameState, PlayerId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Behavior switches for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct MatchOptions {
    /// Let automated seats play free continuations themselves.
    pub autoplay_chains: bool,
    /// Audit every transition and report failures on the bus.
    pub audit_transitions: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// What happened to a move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Applied locally; the state after any chain continuation.
    Applied(Arc<GameState>),
    /// Online play: validated and handed back for the transport.
    Forwarded(MoveRequest),
}

/// A single game between two seats.
#[derive(Debug)]
pub struct Match {
    state: Arc<GameState>,
    bus: NotificationBus,
    synchronizer: Synchronizer,
    chain: ChainReaction,
    audit: bool,
    local_player: Option<PlayerId>,
    room_id: Option<String>,
}

impl Match {
    /// Wraps an initial state. Nothing is published until [`Match::start`].
    #[instrument(skip(initial), fields(grid = initial.grid_size(), mode = %initial.mode()))]
    pub fn new(initial: GameState, options: MatchOptions) -> Self {
        info!("Creating match");
        Self {
            state: Arc::new(initial),
            bus: NotificationBus::new(),
            synchronizer: Synchronizer::new(),
            chain: ChainReaction::new(options.autoplay_chains),
            audit: options.audit_transitions,
            local_player: None,
            room_id: None,
        }
    }

    /// Announces the initial state to subscribers.
    pub fn start(&mut self) {
        let state = Arc::clone(&self.state);
        self.bus.publish(&GameEvent::StateChanged {
            change: ChangeType::Initial,
            state,
            context: "match created".into(),
        });
    }

    /// The current state.
    pub fn state(&self) -> &Arc<GameState> {
        &self.state
    }

    /// Seat controlled by this client in online play.
    pub fn local_player(&self) -> Option<&PlayerId> {
        self.local_player.as_ref()
    }

    /// Sets the seat controlled by this client.
    pub fn set_local_player(&mut self, player: impl Into<PlayerId>) {
        self.local_player = Some(player.into());
    }

    /// Room joined in online play.
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Snapshot counters.
    pub fn synchronizer(&self) -> &Synchronizer {
        &self.synchronizer
    }

    /// Registers a listener.
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> Subscription
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.bus.subscribe(kind, listener)
    }

    /// Cancels a listener.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.bus.unsubscribe(subscription)
    }

    /// Audits the current state.
    pub fn audit(&self) -> ValidationReport {
        validate_state(Some(&self.state))
    }

    /// Submits a move for the current player.
    ///
    /// Local and AI matches apply it, publish the change, then let the chain
    /// controller play any automated continuation. Online matches only
    /// validate it and hand it back for the transport.
    ///
    /// # Errors
    ///
    /// Any [`MoveError`]; the state is unchanged and nothing is published.
    #[instrument(skip(self), fields(turn = self.state.turn(), mode = %self.state.mode()))]
    pub fn request_move(&mut self, start: Point, end: Point) -> Result<MoveOutcome, MoveError> {
        let request = MoveRequest::new(start, end);

        if self.state.mode() == GameMode::Online {
            validate_move(&self.state, start, end)?;
            if let Some(me) = &self.local_player
                && me != self.state.current_player()
            {
                return Err(MoveError::NotYourTurn(self.state.current_player().clone()));
            }
            debug!(%request, "Forwarding move to server");
            return Ok(MoveOutcome::Forwarded(request));
        }

        let transition = if self.audit {
            apply_audited(&self.state, request)?
        } else {
            apply_move(&self.state, request)?
        };
        self.commit(transition, "local move");

        let chain = self.chain.run(&self.state);
        if chain.capped {
            warn!("Chain continuation stopped at its cap");
        }
        for step in chain.steps {
            if self.audit {
                self.audit_continuation(&step.state);
            }
            self.commit(step, "chain continuation");
        }
        Ok(MoveOutcome::Applied(Arc::clone(&self.state)))
    }

    /// Handles one message from the transport.
    ///
    /// # Errors
    ///
    /// [`SyncError`] when a snapshot is missing or malformed. The error is
    /// also published on the bus and the local state is kept.
    #[instrument(skip_all)]
    pub fn receive(&mut self, message: RemoteMessage) -> Result<(), SyncError> {
        match message {
            RemoteMessage::RoomCreated { room_id, player_id } => {
                info!(%room_id, %player_id, "Room created");
                self.room_id = Some(room_id);
                self.local_player = Some(player_id);
                Ok(())
            }
            RemoteMessage::RoomJoined {
                room_id,
                player_id,
                game_state,
            } => {
                info!(%room_id, %player_id, "Room joined");
                self.room_id = Some(room_id);
                self.local_player = Some(player_id);
                match game_state {
                    Some(snapshot) => self.synchronize(Some(snapshot)),
                    None => Ok(()),
                }
            }
            RemoteMessage::PlayerJoined {
                player_id,
                player_name,
            } => {
                info!(%player_id, %player_name, "Player joined");
                Ok(())
            }
            RemoteMessage::PlayerLeft {
                player_id,
                player_name,
            } => {
                info!(%player_id, %player_name, "Player left");
                Ok(())
            }
            RemoteMessage::GameStarted { game_state } => self.synchronize(game_state),
            RemoteMessage::GameStateUpdate(game_state) => self.synchronize(game_state),
        }
    }

    /// Parses and handles a raw JSON message.
    ///
    /// # Errors
    ///
    /// As [`Match::receive`], plus [`SyncError::Malformed`] for unparseable
    /// text.
    pub fn receive_json(&mut self, raw: &str) -> Result<(), SyncError> {
        match RemoteMessage::from_json(raw) {
            Ok(message) => self.receive(message),
            Err(e) => {
                self.report(ErrorKind::Synchronization, e.to_string());
                Err(e)
            }
        }
    }

    /// Consumes transport messages until the channel closes.
    ///
    /// Returns how many messages were handled without error. Dropping the
    /// future cancels the loop; a partially received snapshot is never
    /// applied.
    #[instrument(skip_all)]
    pub async fn follow(&mut self, mut inbox: mpsc::Receiver<RemoteMessage>) -> u64 {
        let mut handled = 0;
        while let Some(message) = inbox.recv().await {
            match self.receive(message) {
                Ok(()) => handled += 1,
                Err(e) => debug!(error = %e, "Skipped remote message"),
            }
        }
        info!(handled, "Transport closed");
        handled
    }

    /// Restarts with the same lattice, seats and mode.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        let fresh = self.state.restarted();
        self.install(fresh, ChangeType::Reset, "match reset", None);
    }

    /// Installs `state` as is, returning its audit.
    ///
    /// The state is accepted even when the audit fails; failures are
    /// reported on the bus.
    #[instrument(skip_all, fields(turn = state.turn()))]
    pub fn force_state(&mut self, state: GameState) -> ValidationReport {
        let report = validate_state(Some(&state));
        self.install(state, ChangeType::Forced, "state forced", None);
        report
    }

    /// Adopts an externally observed state if it differs from the current
    /// one. Returns whether it was adopted.
    #[instrument(skip_all, fields(turn = state.turn()))]
    pub fn observe(&mut self, state: GameState) -> bool {
        if state == *self.state {
            return false;
        }
        self.install(state, ChangeType::AutoDetect, "external change detected", None);
        true
    }

    fn synchronize(&mut self, payload: Option<SnapshotPayload>) -> Result<(), SyncError> {
        match self.synchronizer.reconcile(&self.state, payload) {
            Ok(SyncOutcome::Replaced(state)) => {
                self.install(state, ChangeType::Sync, "authoritative snapshot", None);
                Ok(())
            }
            Ok(SyncOutcome::Unchanged) => Ok(()),
            Err(e) => {
                self.report(ErrorKind::Synchronization, e.to_string());
                Err(e)
            }
        }
    }

    /// Checks an automated step against the move postconditions. Failures
    /// are reported; the step is still committed.
    fn audit_continuation(&mut self, next: &GameState) {
        if let Err(e) = MoveContract::post(self.state.as_ref(), next) {
            self.report(ErrorKind::InvariantViolation, e.to_string());
        }
    }

    fn commit(&mut self, transition: Transition, context: &str) {
        let moved = Some((transition.edge.start(), transition.edge.end()));
        self.install(transition.state, ChangeType::Move, context, moved);
    }

    /// Replaces the current state and publishes what changed, in order:
    /// state, move, turn, end of game.
    fn install(
        &mut self,
        next: GameState,
        change: ChangeType,
        context: &str,
        moved: Option<(Point, Point)>,
    ) {
        let previous = std::mem::replace(&mut self.state, Arc::new(next));
        let state = Arc::clone(&self.state);
        debug!(%change, turn = state.turn(), "State installed");

        if self.audit && change != ChangeType::Move {
            let report = validate_state(Some(&state));
            if !report.valid {
                self.report(ErrorKind::InvariantViolation, report.error_summary());
            }
        }

        self.bus.publish(&GameEvent::StateChanged {
            change,
            state: Arc::clone(&state),
            context: context.to_string(),
        });
        if let Some((start, end)) = moved {
            self.bus.publish(&GameEvent::MoveMade {
                start,
                end,
                state: Arc::clone(&state),
            });
        }
        if previous.current_player() != state.current_player() {
            self.bus.publish(&GameEvent::TurnChanged {
                player: state.current_player().clone(),
                state: Arc::clone(&state),
            });
        }
        if previous.winner().is_none()
            && let Some(winner) = state.winner()
        {
            self.bus.publish(&GameEvent::GameEnded {
                winner: winner.clone(),
                state: Arc::clone(&state),
            });
        }
    }

    fn report(&mut self, kind: ErrorKind, detail: String) {
        warn!(%kind, %detail, "Match error");
        self.bus.publish(&GameEvent::Error { kind, detail });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cubes::geometry::Edge;
    use crate::games::cubes::types::fixtures::fresh;
    use std::sync::Mutex;

    fn p(x: i32, y: i32, z: i32) -> Point {
        Point::new(x, y, z)
    }

    fn recorder(m: &mut Match, kinds: &[EventKind]) -> Arc<Mutex<Vec<EventKind>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        for kind in kinds {
            let sink = Arc::clone(&log);
            m.subscribe(*kind, move |e| sink.lock().unwrap().push(e.kind()));
        }
        log
    }

    #[test]
    fn test_start_publishes_initial() {
        let mut m = Match::new(fresh(3), MatchOptions::default());
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        m.subscribe(EventKind::StateChanged, move |e| {
            if let GameEvent::StateChanged { change, .. } = e {
                *sink.lock().unwrap() = Some(*change);
            }
        });
        m.start();
        assert_eq!(*seen.lock().unwrap(), Some(ChangeType::Initial));
    }

    #[test]
    fn test_move_publishes_in_order() {
        let mut m = Match::new(fresh(3), MatchOptions::default());
        let log = recorder(
            &mut m,
            &[EventKind::StateChanged, EventKind::MoveMade, EventKind::TurnChanged],
        );
        m.request_move(p(0, 0, 0), p(1, 0, 0)).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![EventKind::StateChanged, EventKind::MoveMade, EventKind::TurnChanged]
        );
    }

    #[test]
    fn test_rejected_move_publishes_nothing() {
        let mut m = Match::new(fresh(3), MatchOptions::default());
        let log = recorder(&mut m, &[EventKind::StateChanged, EventKind::Error]);
        let before = Arc::clone(m.state());
        assert!(m.request_move(p(0, 0, 0), p(2, 0, 0)).is_err());
        assert!(log.lock().unwrap().is_empty());
        assert!(Arc::ptr_eq(&before, m.state()));
    }

    #[test]
    fn test_online_move_is_forwarded() {
        let mut state = fresh(3);
        state.mode = GameMode::Online;
        let mut m = Match::new(state, MatchOptions::default());
        m.set_local_player("alice");
        let outcome = m.request_move(p(0, 0, 0), p(0, 0, 1)).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Forwarded(MoveRequest::new(p(0, 0, 0), p(0, 0, 1)))
        );
        assert!(m.state().lines().is_empty());
    }

    #[test]
    fn test_online_out_of_turn_rejected() {
        let mut state = fresh(3);
        state.mode = GameMode::Online;
        let mut m = Match::new(state, MatchOptions::default());
        m.set_local_player("bob");
        assert_eq!(
            m.request_move(p(0, 0, 0), p(0, 0, 1)),
            Err(MoveError::NotYourTurn("alice".into()))
        );
    }

    #[test]
    fn test_reset_returns_to_fresh_state() {
        let mut m = Match::new(fresh(3), MatchOptions::default());
        m.request_move(p(0, 0, 0), p(1, 0, 0)).unwrap();
        m.reset();
        assert_eq!(**m.state(), fresh(3));
    }

    #[test]
    fn test_observe_ignores_identical_state() {
        let mut m = Match::new(fresh(3), MatchOptions::default());
        assert!(!m.observe(fresh(3)));
        let mut other = fresh(3);
        other.current_player = "bob".into();
        assert!(m.observe(other));
        assert_eq!(m.state().current_player(), "bob");
    }

    #[test]
    fn test_broken_continuation_is_reported() {
        let mut m = Match::new(fresh(3), MatchOptions::default());
        m.request_move(p(0, 0, 0), p(1, 0, 0)).unwrap();
        let errors = recorder(&mut m, &[EventKind::Error]);
        let rewound = fresh(3);
        m.audit_continuation(&rewound);
        assert_eq!(*errors.lock().unwrap(), vec![EventKind::Error]);
    }

    #[test]
    fn test_audited_chain_reports_nothing() {
        let mut state = fresh(2);
        state.players[1].is_ai = true;
        let mut m = Match::new(state, MatchOptions::default());
        let errors = recorder(&mut m, &[EventKind::Error]);
        for (a, b) in [
            (p(0, 0, 0), p(1, 0, 0)),
            (p(1, 0, 0), p(1, 1, 0)),
            (p(1, 1, 0), p(0, 1, 0)),
            (p(1, 0, 0), p(1, 0, 1)),
            (p(0, 0, 1), p(1, 0, 1)),
        ] {
            m.request_move(a, b).unwrap();
        }
        // bob closes the floor, then the controller closes the y = 0 wall.
        m.request_move(p(0, 1, 0), p(0, 0, 0)).unwrap();

        let closing = Edge::new(p(0, 0, 0), p(0, 0, 1)).unwrap();
        assert!(m.state().has_line(closing));
        assert!(m.state().faces().len() >= 2);
        assert!(errors.lock().unwrap().is_empty());
        assert!(m.audit().valid);
    }

    #[test]
    fn test_forced_invalid_state_is_reported() {
        let mut m = Match::new(fresh(3), MatchOptions::default());
        let errors = recorder(&mut m, &[EventKind::Error]);
        let mut bad = fresh(3);
        bad.grid_size = 99;
        let report = m.force_state(bad);
        assert!(!report.valid);
        assert_eq!(m.state().grid_size(), 99);
        assert_eq!(*errors.lock().unwrap(), vec![EventKind::Error]);
    }
}
