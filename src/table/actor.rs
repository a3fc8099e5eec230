//! Room actor implementation with async message handling.
//!
//! Each room runs in its own tokio task and owns all of its state: the
//! seat roster, the hand in flight, and the add-on queue. Every mutation
//! arrives through the mpsc inbox, so hand state has exactly one writer
//! and actions are applied strictly in arrival order. A one-second tick
//! drives the turn clock; a seat that runs out of time is folded by the
//! room itself.

use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::{Duration, Instant, interval},
};
use uuid::Uuid;

use super::config::RoomConfig;
use super::messages::{RoomEvent, RoomMessage};
use crate::game::betting::ActionResult;
use crate::game::entities::{
    Action, AddonRequest, AddonStatus, Chips, GameSnapshot, HandVersion, HandView, Phase, Player,
    PlayerId, RoomStatus, SeatIndex, ValidAction,
};
use crate::game::errors::{EngineError, EngineResult};
use crate::game::pot::Payout;

const INBOX_CAPACITY: usize = 100;
const EVENT_CAPACITY: usize = 64;

/// Handle for talking to a running room.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    events: broadcast::Sender<RoomEvent>,
}

impl RoomHandle {
    /// Subscribe to the room's event feed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    /// Send a raw message to the room.
    pub async fn send(&self, message: RoomMessage) -> EngineResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| EngineError::RoomClosed)
    }

    pub async fn join(&self) -> EngineResult<(PlayerId, SeatIndex)> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::Join { response }).await?;
        rx.await.map_err(|_| EngineError::RoomClosed)?
    }

    pub async fn leave(&self, player_id: PlayerId) -> EngineResult<()> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::Leave {
            player_id,
            response,
        })
        .await?;
        rx.await.map_err(|_| EngineError::RoomClosed)?
    }

    pub async fn start_hand(&self) -> EngineResult<HandVersion> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::StartHand { response }).await?;
        rx.await.map_err(|_| EngineError::RoomClosed)?
    }

    pub async fn next_hand(&self) -> EngineResult<HandVersion> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::NextHand { response }).await?;
        rx.await.map_err(|_| EngineError::RoomClosed)?
    }

    pub async fn take_action(
        &self,
        player_id: PlayerId,
        version: HandVersion,
        action: Action,
    ) -> EngineResult<ActionResult> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::TakeAction {
            player_id,
            version,
            action,
            response,
        })
        .await?;
        rx.await.map_err(|_| EngineError::RoomClosed)?
    }

    pub async fn view(&self, player_id: PlayerId) -> EngineResult<HandView> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::GetView {
            player_id,
            response,
        })
        .await?;
        rx.await.map_err(|_| EngineError::RoomClosed)?
    }

    pub async fn valid_actions(&self, player_id: PlayerId) -> EngineResult<Vec<ValidAction>> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::GetValidActions {
            player_id,
            response,
        })
        .await?;
        rx.await.map_err(|_| EngineError::RoomClosed)?
    }

    pub async fn request_addon(&self, player_id: PlayerId, amount: Chips) -> EngineResult<Uuid> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::RequestAddon {
            player_id,
            amount,
            response,
        })
        .await?;
        rx.await.map_err(|_| EngineError::RoomClosed)?
    }

    pub async fn resolve_addon(&self, request_id: Uuid, approve: bool) -> EngineResult<()> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::ResolveAddon {
            request_id,
            approve,
            response,
        })
        .await?;
        rx.await.map_err(|_| EngineError::RoomClosed)?
    }

    pub async fn close(&self) -> EngineResult<()> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::Close { response }).await?;
        rx.await.map_err(|_| EngineError::RoomClosed)
    }
}

/// Room actor owning one table's state.
pub struct RoomActor {
    config: RoomConfig,
    status: RoomStatus,

    /// Seat roster, ascending seat order. Authoritative between hands;
    /// during a hand the snapshot's copy is authoritative and is synced
    /// back at settlement.
    players: Vec<Player>,

    /// Hand in flight, kept through showdown for late viewers.
    game: Option<GameSnapshot>,

    addons: Vec<AddonRequest>,

    /// Approved add-ons waiting for the current hand to finish.
    pending_credits: Vec<(PlayerId, Chips)>,

    hand_counter: HandVersion,
    previous_dealer: Option<SeatIndex>,

    /// Turn clock for the seat to act, re-armed whenever the turn moves.
    turn_deadline: Option<(HandVersion, SeatIndex, Instant)>,

    inbox: mpsc::Receiver<RoomMessage>,
    events: broadcast::Sender<RoomEvent>,
    is_closed: bool,
}

impl RoomActor {
    /// Create a room and the handle for reaching it. The actor does
    /// nothing until [`run`](Self::run) is spawned.
    #[must_use]
    pub fn new(config: RoomConfig) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let actor = Self {
            config,
            status: RoomStatus::Waiting,
            players: Vec::new(),
            game: None,
            addons: Vec::new(),
            pending_credits: Vec::new(),
            hand_counter: 0,
            previous_dealer: None,
            turn_deadline: None,
            inbox,
            events: events.clone(),
            is_closed: false,
        };
        (actor, RoomHandle { sender, events })
    }

    /// Run the room event loop until closed or all handles are dropped.
    pub async fn run(mut self) {
        log::info!("Room '{}' starting", self.config.name);
        let mut tick_interval = interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => break,
                    }
                    if self.is_closed {
                        break;
                    }
                }
                _ = tick_interval.tick() => self.tick(),
            }
        }
        log::info!("Room '{}' closed", self.config.name);
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join { response } => {
                let _ = response.send(self.handle_join());
            }
            RoomMessage::Leave {
                player_id,
                response,
            } => {
                let _ = response.send(self.handle_leave(player_id));
            }
            RoomMessage::StartHand { response } | RoomMessage::NextHand { response } => {
                let _ = response.send(self.deal_hand());
            }
            RoomMessage::TakeAction {
                player_id,
                version,
                action,
                response,
            } => {
                let _ = response.send(self.handle_action(player_id, version, action));
            }
            RoomMessage::GetView {
                player_id,
                response,
            } => {
                let _ = response.send(self.handle_view(player_id));
            }
            RoomMessage::GetValidActions {
                player_id,
                response,
            } => {
                let _ = response.send(self.handle_valid_actions(player_id));
            }
            RoomMessage::RequestAddon {
                player_id,
                amount,
                response,
            } => {
                let _ = response.send(self.handle_request_addon(player_id, amount));
            }
            RoomMessage::ResolveAddon {
                request_id,
                approve,
                response,
            } => {
                let _ = response.send(self.handle_resolve_addon(request_id, approve));
            }
            RoomMessage::Close { response } => {
                self.is_closed = true;
                self.status = RoomStatus::Finished;
                let _ = response.send(());
            }
        }
    }

    fn handle_join(&mut self) -> EngineResult<(PlayerId, SeatIndex)> {
        let seat = (0..self.config.max_seats)
            .find(|s| self.players.iter().all(|p| p.seat != *s))
            .ok_or(EngineError::RoomFull)?;
        let player = Player::new(seat, self.config.starting_stack);
        let player_id = player.id;
        self.players.push(player);
        self.players.sort_unstable_by_key(|p| p.seat);
        log::info!(
            "Room '{}': player {player_id} seated at {seat}",
            self.config.name
        );
        self.emit(RoomEvent::PlayerJoined { player_id, seat });
        Ok((player_id, seat))
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> EngineResult<()> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(EngineError::UnknownPlayer(player_id))?;
        player.connected = false;
        if self.hand_in_flight() {
            // Dealt in, so the seat stays until settlement; the turn
            // clock folds it if it comes up.
            if let Some(game) = self.game.as_mut()
                && let Some(p) = game.players.iter_mut().find(|p| p.id == player_id)
            {
                p.connected = false;
            }
        } else {
            self.players.retain(|p| p.id != player_id);
        }
        self.emit(RoomEvent::PlayerLeft { player_id });
        Ok(())
    }

    fn deal_hand(&mut self) -> EngineResult<HandVersion> {
        if self.hand_in_flight() {
            return Err(EngineError::HandInProgress);
        }
        let version = self.hand_counter + 1;
        let game = GameSnapshot::start_hand(
            self.config.blinds(),
            self.players.clone(),
            self.previous_dealer,
            version,
        )?;
        self.hand_counter = version;
        self.status = RoomStatus::Playing;
        log::info!(
            "Room '{}': hand {version} dealt, button at seat {}",
            self.config.name,
            game.hand.dealer_seat
        );
        self.emit(RoomEvent::HandStarted {
            version,
            dealer_seat: game.hand.dealer_seat,
        });
        self.game = Some(game);

        // The blinds can leave nobody able to act (short stacks forced
        // all-in); such a hand plays itself out immediately.
        let waiting_on_turn = self
            .game
            .as_ref()
            .is_some_and(|g| g.hand.current_seat.is_some());
        if waiting_on_turn {
            self.refresh_turn_deadline();
        } else if let Some(game) = self.game.as_mut() {
            let payouts = game.run_out()?;
            self.finish_hand(payouts);
        }
        Ok(version)
    }

    fn handle_action(
        &mut self,
        player_id: PlayerId,
        version: HandVersion,
        action: Action,
    ) -> EngineResult<ActionResult> {
        let game = self.game.as_mut().ok_or(EngineError::NoActiveHand)?;
        if game.hand.phase == Phase::Showdown {
            return Err(EngineError::NoActiveHand);
        }
        if version != game.hand.version {
            return Err(EngineError::StaleState {
                expected: game.hand.version,
                got: version,
            });
        }
        let seat = game
            .seat_of(player_id)
            .ok_or(EngineError::UnknownPlayer(player_id))?;
        let result = game.apply_action(seat, action)?;
        self.emit(RoomEvent::ActionTaken {
            version,
            seat,
            action,
        });
        if result.hand_complete {
            self.finish_hand(result.payouts.clone());
        } else {
            self.refresh_turn_deadline();
        }
        Ok(result)
    }

    fn handle_view(&self, player_id: PlayerId) -> EngineResult<HandView> {
        if !self.players.iter().any(|p| p.id == player_id) {
            return Err(EngineError::UnknownPlayer(player_id));
        }
        let game = self.game.as_ref().ok_or(EngineError::NoActiveHand)?;
        Ok(game.view_for(player_id))
    }

    fn handle_valid_actions(&self, player_id: PlayerId) -> EngineResult<Vec<ValidAction>> {
        let game = self.game.as_ref().ok_or(EngineError::NoActiveHand)?;
        let seat = game
            .seat_of(player_id)
            .ok_or(EngineError::UnknownPlayer(player_id))?;
        if game.hand.phase == Phase::Showdown {
            return Ok(Vec::new());
        }
        game.valid_actions(seat)
    }

    fn handle_request_addon(&mut self, player_id: PlayerId, amount: Chips) -> EngineResult<Uuid> {
        let player = self
            .players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or(EngineError::UnknownPlayer(player_id))?;
        // The credited stack must stay within chip range.
        if amount == 0 || player.chips.checked_add(amount).is_none() {
            return Err(EngineError::InvalidAmount {
                amount,
                min: 1,
                max: Chips::MAX - player.chips,
            });
        }
        let request = AddonRequest::new(player_id, amount);
        let request_id = request.id;
        self.addons.push(request);
        self.emit(RoomEvent::AddonRequested {
            request_id,
            player_id,
            amount,
        });
        Ok(request_id)
    }

    fn handle_resolve_addon(&mut self, request_id: Uuid, approve: bool) -> EngineResult<()> {
        let request = self
            .addons
            .iter_mut()
            .find(|r| r.id == request_id && r.status == AddonStatus::Pending)
            .ok_or(EngineError::UnknownAddonRequest)?;
        request.status = if approve {
            AddonStatus::Approved
        } else {
            AddonStatus::Rejected
        };
        let (player_id, amount) = (request.player_id, request.amount);
        if approve {
            // Stacks are frozen while a hand plays; the credit lands at
            // settlement.
            if self.hand_in_flight() {
                self.pending_credits.push((player_id, amount));
            } else if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
                // The stack may have grown since the request was vetted.
                player.chips = player.chips.saturating_add(amount);
            }
            log::info!(
                "Room '{}': add-on of ${amount} approved for {player_id}",
                self.config.name
            );
        }
        self.emit(RoomEvent::AddonResolved {
            request_id,
            approved: approve,
        });
        Ok(())
    }

    /// Sync the settled hand back into the roster and apply whatever was
    /// queued while it played.
    fn finish_hand(&mut self, payouts: Vec<Payout>) {
        if let Some(game) = &self.game {
            self.previous_dealer = Some(game.hand.dealer_seat);
            self.players = game.players.clone();
            self.emit(RoomEvent::HandComplete {
                version: game.hand.version,
                payouts,
            });
        }
        self.turn_deadline = None;
        for (player_id, amount) in std::mem::take(&mut self.pending_credits) {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
                player.chips = player.chips.saturating_add(amount);
            }
        }
        self.players.retain(|p| p.connected);
        // Keep the settled snapshot's stacks in line with the roster so
        // views between hands show credited add-ons.
        if let Some(game) = self.game.as_mut() {
            game.players = self.players.clone();
        }
        let funded = self.players.iter().filter(|p| p.chips > 0).count();
        if funded < crate::game::constants::MIN_PLAYERS {
            log::info!(
                "Room '{}': only {funded} funded player(s) left",
                self.config.name
            );
            self.status = RoomStatus::Finished;
        }
    }

    fn hand_in_flight(&self) -> bool {
        self.game
            .as_ref()
            .is_some_and(|g| g.hand.phase != Phase::Showdown)
    }

    /// Re-arm the turn clock if the turn has moved since it was last set.
    fn refresh_turn_deadline(&mut self) {
        let Some(game) = &self.game else {
            self.turn_deadline = None;
            return;
        };
        match game.hand.current_seat {
            Some(seat) if game.hand.phase != Phase::Showdown => {
                let version = game.hand.version;
                let unchanged =
                    matches!(self.turn_deadline, Some((v, s, _)) if v == version && s == seat);
                if !unchanged {
                    let deadline =
                        Instant::now() + Duration::from_secs(self.config.turn_timeout_secs);
                    self.turn_deadline = Some((version, seat, deadline));
                }
            }
            _ => self.turn_deadline = None,
        }
    }

    /// One-second tick: fold the seat to act if its clock ran out.
    fn tick(&mut self) {
        let Some((version, seat, deadline)) = self.turn_deadline else {
            return;
        };
        if Instant::now() < deadline {
            return;
        }
        log::info!(
            "Room '{}': seat {seat} timed out, folding",
            self.config.name
        );
        self.emit(RoomEvent::PlayerTimedOut { version, seat });
        let Some(game) = self.game.as_mut() else {
            self.turn_deadline = None;
            return;
        };
        match game.apply_action(seat, Action::Fold) {
            Ok(result) => {
                self.emit(RoomEvent::ActionTaken {
                    version,
                    seat,
                    action: Action::Fold,
                });
                if result.hand_complete {
                    self.finish_hand(result.payouts);
                } else {
                    self.refresh_turn_deadline();
                }
            }
            Err(e) => {
                log::error!(
                    "Room '{}': timeout fold for seat {seat} failed: {e}",
                    self.config.name
                );
                self.turn_deadline = None;
            }
        }
    }

    fn emit(&self, event: RoomEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    #[must_use]
    pub fn status(&self) -> RoomStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_room(config: RoomConfig) -> RoomHandle {
        let (actor, handle) = RoomActor::new(config);
        tokio::spawn(actor.run());
        handle
    }

    #[tokio::test]
    async fn test_join_assigns_lowest_free_seat() {
        let handle = spawn_room(RoomConfig::default());
        let (_, seat_a) = handle.join().await.unwrap();
        let (_, seat_b) = handle.join().await.unwrap();
        assert_eq!(seat_a, 0);
        assert_eq!(seat_b, 1);
    }

    #[tokio::test]
    async fn test_join_fails_when_room_is_full() {
        let handle = spawn_room(RoomConfig {
            max_seats: 2,
            ..RoomConfig::default()
        });
        handle.join().await.unwrap();
        handle.join().await.unwrap();
        assert_eq!(handle.join().await.unwrap_err(), EngineError::RoomFull);
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let handle = spawn_room(RoomConfig::default());
        let (alice, _) = handle.join().await.unwrap();
        handle.join().await.unwrap();
        let version = handle.start_hand().await.unwrap();
        let err = handle
            .take_action(alice, version + 1, Action::Call)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::StaleState {
                expected: version,
                got: version + 1,
            }
        );
    }

    #[tokio::test]
    async fn test_second_deal_while_hand_in_flight_is_rejected() {
        let handle = spawn_room(RoomConfig::default());
        handle.join().await.unwrap();
        handle.join().await.unwrap();
        handle.start_hand().await.unwrap();
        assert_eq!(
            handle.next_hand().await.unwrap_err(),
            EngineError::HandInProgress
        );
    }

    #[tokio::test]
    async fn test_addon_that_would_overflow_the_stack_is_rejected() {
        let handle = spawn_room(RoomConfig::default());
        let (alice, _) = handle.join().await.unwrap();

        let err = handle.request_addon(alice, Chips::MAX).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount {
                amount: Chips::MAX,
                min: 1,
                max: Chips::MAX - 1000,
            }
        );
        // The room survived the rejected request.
        let (_, seat) = handle.join().await.unwrap();
        assert_eq!(seat, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_timeout_folds_the_acting_seat() {
        let handle = spawn_room(RoomConfig {
            turn_timeout_secs: 5,
            ..RoomConfig::default()
        });
        let mut events = handle.subscribe();
        let (alice, _) = handle.join().await.unwrap();
        handle.join().await.unwrap();
        handle.start_hand().await.unwrap();

        // Heads-up: the dealer (alice, seat 0) is on the clock. Let it
        // expire without acting.
        tokio::time::sleep(Duration::from_secs(10)).await;

        let mut timed_out = None;
        while let Ok(event) = events.try_recv() {
            if let RoomEvent::PlayerTimedOut { seat, .. } = event {
                timed_out = Some(seat);
            }
        }
        assert_eq!(timed_out, Some(0));
        // The fold ended the hand heads-up; alice lost her small blind.
        let view = handle.view(alice).await.unwrap();
        let alice_seat = view.seats.iter().find(|s| s.player_id == alice).unwrap();
        assert_eq!(alice_seat.chips, 990);
    }
}
