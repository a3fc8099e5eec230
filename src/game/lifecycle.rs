//! Hand lifecycle: dealing in, posting blinds, and settlement.

use chrono::Utc;

use super::constants;
use super::entities::{
    Blinds, Chips, Deck, GameSnapshot, Hand, HandVersion, Phase, Player, PlayerHand, SeatIndex,
};
use super::errors::{EngineError, EngineResult};
use super::pot::{self, Payout};

impl GameSnapshot {
    /// Deal a fresh hand: shuffle, deal hole cards to every seat with
    /// chips, rotate the dealer button, and post the blinds.
    ///
    /// The dealer moves to the first funded seat strictly after
    /// `previous_dealer`, wrapping to the lowest; heads-up the dealer
    /// posts the small blind and acts first preflop. A blind larger than
    /// its poster's stack is capped and puts the poster all-in.
    ///
    /// If the blinds alone leave fewer than two players able to act,
    /// `hand.current_seat` comes back `None` with the hand still preflop;
    /// the caller runs the board out instead of waiting for a turn.
    pub fn start_hand(
        blinds: Blinds,
        mut players: Vec<Player>,
        previous_dealer: Option<SeatIndex>,
        version: HandVersion,
    ) -> EngineResult<Self> {
        players.sort_unstable_by_key(|p| p.seat);
        let dealt_seats: Vec<SeatIndex> = players
            .iter()
            .filter(|p| p.chips > 0)
            .map(|p| p.seat)
            .collect();
        if dealt_seats.len() < constants::MIN_PLAYERS {
            return Err(EngineError::NotEnoughPlayers);
        }

        // Next funded seat strictly after, wrapping to the lowest.
        let ring = |seat: SeatIndex| {
            dealt_seats
                .iter()
                .copied()
                .find(|&s| s > seat)
                .unwrap_or(dealt_seats[0])
        };
        let dealer_seat = match previous_dealer {
            Some(prev) => ring(prev),
            None => dealt_seats[0],
        };
        let (small_seat, big_seat) = if dealt_seats.len() == 2 {
            (dealer_seat, ring(dealer_seat))
        } else {
            let small = ring(dealer_seat);
            (small, ring(small))
        };

        let mut deck = Deck::new();
        deck.shuffle();
        let mut player_hands = Vec::with_capacity(dealt_seats.len());
        for player in players.iter().filter(|p| p.chips > 0) {
            let cards = deck.deal(constants::HOLE_CARDS)?;
            player_hands.push(PlayerHand::new(player.id, [cards[0], cards[1]]));
        }

        let mut game = Self {
            blinds,
            players,
            hand: Hand {
                version,
                dealer_seat,
                phase: Phase::Preflop,
                community_cards: Vec::new(),
                pot: 0,
                current_bet: blinds.big,
                last_raise: blinds.big,
                current_seat: None,
                deck,
                turn_start_time: Utc::now(),
            },
            player_hands,
        };
        game.post_blind(small_seat, blinds.small)?;
        game.post_blind(big_seat, blinds.big)?;

        if game.eligible_seats().len() >= 2 {
            game.hand.current_seat = game.next_eligible_after(big_seat);
            game.hand.turn_start_time = Utc::now();
        }
        Ok(game)
    }

    /// Post a forced bet, capped at the poster's stack. Does not count as
    /// acting, so the poster keeps its option to raise.
    fn post_blind(&mut self, seat: SeatIndex, amount: Chips) -> EngineResult<()> {
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

        let posted = amount.min(self.players[p_idx].chips);
        self.players[p_idx].chips -= posted;
        let hand = &mut self.player_hands[h_idx];
        hand.current_bet += posted;
        hand.total_contributed += posted;
        if self.players[p_idx].chips == 0 {
            hand.is_all_in = true;
        }
        self.hand.pot += posted;
        Ok(())
    }

    /// Pay the pot out and close the hand.
    pub(crate) fn settle(&mut self) -> EngineResult<Vec<Payout>> {
        let payouts = pot::allocate(&self.player_hands, &self.hand.community_cards);
        for payout in &payouts {
            // player_hands are built from players, so the lookup cannot
            // miss.
            if let Some(player) = self.players.iter_mut().find(|p| p.id == payout.player_id) {
                player.chips += payout.amount;
            }
        }
        self.hand.pot = 0;
        self.hand.phase = Phase::Showdown;
        self.hand.current_seat = None;
        Ok(payouts)
    }
}
