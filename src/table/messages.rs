//! Room actor message and event types.

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::game::betting::ActionResult;
use crate::game::entities::{
    Action, Chips, HandVersion, HandView, PlayerId, SeatIndex, ValidAction,
};
use crate::game::errors::EngineResult;
use crate::game::pot::Payout;

/// Messages that can be sent to a [`RoomActor`](super::actor::RoomActor).
#[derive(Debug)]
pub enum RoomMessage {
    /// Seat a new player with the configured starting stack
    Join {
        response: oneshot::Sender<EngineResult<(PlayerId, SeatIndex)>>,
    },

    /// Mark a player as disconnected; the turn timer folds for them
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<EngineResult<()>>,
    },

    /// Deal the first hand
    StartHand {
        response: oneshot::Sender<EngineResult<HandVersion>>,
    },

    /// Deal the next hand after the current one settled
    NextHand {
        response: oneshot::Sender<EngineResult<HandVersion>>,
    },

    /// Player action (fold, check, call, raise, all-in). `version` must
    /// match the hand in flight or the action is rejected as stale.
    TakeAction {
        player_id: PlayerId,
        version: HandVersion,
        action: Action,
        response: oneshot::Sender<EngineResult<ActionResult>>,
    },

    /// Get the hand as `player_id` is allowed to see it
    GetView {
        player_id: PlayerId,
        response: oneshot::Sender<EngineResult<HandView>>,
    },

    /// Get the legal actions for `player_id` right now
    GetValidActions {
        player_id: PlayerId,
        response: oneshot::Sender<EngineResult<Vec<ValidAction>>>,
    },

    /// Ask the host for more chips
    RequestAddon {
        player_id: PlayerId,
        amount: Chips,
        response: oneshot::Sender<EngineResult<Uuid>>,
    },

    /// Host decision on a pending add-on request
    ResolveAddon {
        request_id: Uuid,
        approve: bool,
        response: oneshot::Sender<EngineResult<()>>,
    },

    /// Shut the room down
    Close {
        response: oneshot::Sender<()>,
    },
}

/// Broadcast notifications fanned out to every subscriber as the room
/// changes. These double as the room's action log.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    PlayerJoined {
        player_id: PlayerId,
        seat: SeatIndex,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    HandStarted {
        version: HandVersion,
        dealer_seat: SeatIndex,
    },
    ActionTaken {
        version: HandVersion,
        seat: SeatIndex,
        action: Action,
    },
    /// The acting seat ran out its clock and was folded
    PlayerTimedOut {
        version: HandVersion,
        seat: SeatIndex,
    },
    HandComplete {
        version: HandVersion,
        payouts: Vec<Payout>,
    },
    AddonRequested {
        request_id: Uuid,
        player_id: PlayerId,
        amount: Chips,
    },
    AddonResolved {
        request_id: Uuid,
        approved: bool,
    },
}
