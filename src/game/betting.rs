//! Betting state machine.
//!
//! All mutation of a hand in flight goes through [`GameSnapshot::apply_action`]:
//! validate the submitted action against the legal set, move the chips, then
//! resolve what happens next (pass the turn, advance the street, run the board
//! out, or settle the pot). A rejected action mutates nothing.

use chrono::Utc;

use super::entities::{Action, Chips, GameSnapshot, Phase, SeatIndex, ValidAction};
use super::errors::{EngineError, EngineResult};
use super::pot::Payout;

/// Outcome of one applied action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionResult {
    pub seat: SeatIndex,
    pub action: Action,
    /// The betting round closed (street advanced or hand ended).
    pub round_complete: bool,
    /// The hand ended, by fold-out or showdown.
    pub hand_complete: bool,
    /// Phase after resolution.
    pub phase: Phase,
    /// Non-empty exactly when `hand_complete`.
    pub payouts: Vec<Payout>,
}

impl GameSnapshot {
    /// The legal actions for `seat` with their amount bounds. Empty for a
    /// seat that is folded or already all-in.
    pub fn valid_actions(&self, seat: SeatIndex) -> EngineResult<Vec<ValidAction>> {
        if self.hand.phase == Phase::Showdown {
            return Err(EngineError::NoActiveHand);
        }
        let player = self
            .player_by_seat(seat)
            .ok_or(EngineError::SeatNotInHand(seat))?;
        let hand = self
            .player_hand(player.id)
            .ok_or(EngineError::SeatNotInHand(seat))?;
        if hand.is_folded || hand.is_all_in {
            return Ok(Vec::new());
        }

        let owed = self.hand.current_bet.saturating_sub(hand.current_bet);
        let mut actions = vec![ValidAction::Fold];
        if owed == 0 {
            actions.push(ValidAction::Check);
        }
        if player.chips <= owed {
            // Calling the full amount is out of reach; the whole stack goes
            // in as a call-for-less.
            actions.push(ValidAction::AllIn(player.chips));
            return Ok(actions);
        }
        if owed > 0 {
            actions.push(ValidAction::Call(owed));
        }
        // A raise is only a raise when the stack strictly exceeds the
        // minimum raise-to; at or below that, the whole stack goes in as
        // a shove instead.
        let min_to = self.hand.current_bet + self.hand.last_raise.max(self.blinds.big);
        let max_to = hand.current_bet + player.chips;
        if max_to > min_to {
            actions.push(ValidAction::Raise {
                min: min_to,
                max: max_to,
            });
        }
        actions.push(ValidAction::AllIn(player.chips));
        Ok(actions)
    }

    /// Validate `action` for `seat` without applying it.
    pub fn check_action(&self, seat: SeatIndex, action: Action) -> EngineResult<()> {
        if self.hand.phase == Phase::Showdown {
            return Err(EngineError::NoActiveHand);
        }
        let player = self
            .player_by_seat(seat)
            .ok_or(EngineError::SeatNotInHand(seat))?;
        let hand = self
            .player_hand(player.id)
            .ok_or(EngineError::SeatNotInHand(seat))?;
        if hand.is_folded || hand.is_all_in {
            return Err(EngineError::InvalidAction);
        }

        let owed = self.hand.current_bet.saturating_sub(hand.current_bet);
        match action {
            Action::Fold => Ok(()),
            Action::Check if owed == 0 => Ok(()),
            Action::Call if owed > 0 => Ok(()),
            Action::AllIn if player.chips > 0 => Ok(()),
            Action::Raise(amount) => {
                if player.chips <= owed {
                    return Err(EngineError::InvalidAction);
                }
                let min = self.hand.current_bet + self.hand.last_raise.max(self.blinds.big);
                let max = hand.current_bet + player.chips;
                if max <= min {
                    // A stack that cannot beat the minimum raise-to has
                    // no raise, only a shove.
                    return Err(EngineError::InvalidAction);
                }
                if amount < min || amount > max {
                    return Err(EngineError::InvalidAmount { amount, min, max });
                }
                Ok(())
            }
            _ => Err(EngineError::InvalidAction),
        }
    }

    /// Apply one action for the seat to act and resolve the consequences.
    ///
    /// On success the snapshot reflects the full aftermath: chips moved,
    /// the turn reassigned, streets dealt as needed, and, when the hand
    /// ended, stacks credited from the pot.
    pub fn apply_action(&mut self, seat: SeatIndex, action: Action) -> EngineResult<ActionResult> {
        if self.hand.phase == Phase::Showdown {
            return Err(EngineError::NoActiveHand);
        }
        if self.hand.current_seat != Some(seat) {
            return Err(EngineError::OutOfTurn);
        }
        self.check_action(seat, action)?;

        let player_id = self
            .player_by_seat(seat)
            .ok_or(EngineError::SeatNotInHand(seat))?
            .id;
        let p_idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(EngineError::SeatNotInHand(seat))?;
        let h_idx = self
            .player_hands
            .iter()
            .position(|ph| ph.player_id == player_id)
            .ok_or(EngineError::SeatNotInHand(seat))?;

        let stack = self.players[p_idx].chips;
        let owed = self
            .hand
            .current_bet
            .saturating_sub(self.player_hands[h_idx].current_bet);
        let old_current_bet = self.hand.current_bet;

        // check_action already bounded every amount below.
        let mut moved: Chips = 0;
        match action {
            Action::Fold => self.player_hands[h_idx].is_folded = true,
            Action::Check => {}
            Action::Call => moved = owed.min(stack),
            Action::Raise(amount) => {
                moved = amount - self.player_hands[h_idx].current_bet;
                self.hand.last_raise = amount - self.hand.current_bet;
                self.hand.current_bet = amount;
            }
            Action::AllIn => {
                moved = stack;
                let new_bet = self.player_hands[h_idx].current_bet + moved;
                if new_bet > self.hand.current_bet {
                    self.hand.last_raise = new_bet - self.hand.current_bet;
                    self.hand.current_bet = new_bet;
                }
                self.player_hands[h_idx].is_all_in = true;
            }
        }
        self.players[p_idx].chips -= moved;
        {
            let hand = &mut self.player_hands[h_idx];
            hand.current_bet += moved;
            hand.total_contributed += moved;
            hand.has_acted = true;
        }
        if self.players[p_idx].chips == 0 && action != Action::Fold {
            self.player_hands[h_idx].is_all_in = true;
        }
        self.hand.pot += moved;

        // A raised bet reopens the round: everyone else still live has to
        // act on the new level.
        if self.hand.current_bet > old_current_bet {
            for (i, ph) in self.player_hands.iter_mut().enumerate() {
                if i != h_idx && !ph.is_folded && !ph.is_all_in {
                    ph.has_acted = false;
                }
            }
        }

        let mut payouts = Vec::new();
        let mut round_complete = false;
        let mut hand_complete = false;
        if self.non_folded_count() == 1 {
            // Everyone else folded; the pot goes over uncontested.
            payouts = self.settle()?;
            round_complete = true;
            hand_complete = true;
        } else if self.is_betting_round_complete() {
            round_complete = true;
            if self.hand.phase == Phase::River {
                payouts = self.settle()?;
                hand_complete = true;
            } else {
                self.advance_round()?;
                if self.eligible_seats().len() >= 2 {
                    self.hand.current_seat = self.next_eligible_after(self.hand.dealer_seat);
                    self.hand.turn_start_time = Utc::now();
                } else {
                    // Not enough live stacks left to bet; deal the board
                    // out and go straight to showdown.
                    payouts = self.run_out()?;
                    hand_complete = true;
                }
            }
        } else {
            self.hand.current_seat = self.next_eligible_after(seat);
            self.hand.turn_start_time = Utc::now();
        }

        Ok(ActionResult {
            seat,
            action,
            round_complete,
            hand_complete,
            phase: self.hand.phase,
            payouts,
        })
    }

    /// A round is closed when every live player is all-in or has acted at
    /// the current bet level. Blind posts do not count as acting, which is
    /// what gives the big blind its preflop option.
    #[must_use]
    pub fn is_betting_round_complete(&self) -> bool {
        self.player_hands
            .iter()
            .filter(|ph| !ph.is_folded)
            .all(|ph| ph.is_all_in || (ph.has_acted && ph.current_bet == self.hand.current_bet))
    }

    /// First eligible seat strictly after `seat`, wrapping to the lowest.
    pub(crate) fn next_eligible_after(&self, seat: SeatIndex) -> Option<SeatIndex> {
        let seats = self.eligible_seats();
        seats
            .iter()
            .copied()
            .find(|&s| s > seat)
            .or_else(|| seats.first().copied())
    }

    /// Deal into the next street and reset round-local betting state.
    pub(crate) fn advance_round(&mut self) -> EngineResult<()> {
        let next = self.hand.phase.next();
        let dealt = self.hand.deck.deal(next.cards_on_entry())?;
        self.hand.community_cards.extend(dealt);
        self.hand.phase = next;
        self.hand.current_bet = 0;
        self.hand.last_raise = self.blinds.big;
        for ph in &mut self.player_hands {
            ph.current_bet = 0;
            ph.has_acted = false;
        }
        Ok(())
    }

    /// Deal all remaining streets with no betting, then settle.
    pub(crate) fn run_out(&mut self) -> EngineResult<Vec<Payout>> {
        self.hand.current_seat = None;
        while self.hand.phase < Phase::River {
            self.advance_round()?;
        }
        self.settle()
    }
}
