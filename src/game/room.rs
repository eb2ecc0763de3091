use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use super::cards::{Card, CardFace};
use super::deck::Deck;
use super::errors::GameError;
use super::events::PlayerView;
use super::hand::{Hand, HAND_SIZE};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
pub const INITIAL_REVEALS: u8 = 2;

/// Room lifecycle.
///
/// `Dealt` covers the simultaneous initial reveal; the room moves straight on
/// to `InProgress` as soon as every player has turned two cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GamePhase {
    Lobby,
    Dealt,
    InProgress,
    LastRound,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSource {
    Deck,
    Discard,
}

/// Where the player stands within their own turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TurnState {
    #[default]
    Idle,
    /// Holding a drawn card that must be swapped in or discarded
    Holding { card: CardFace, source: DrawSource },
    /// Discarded a card drawn from the deck, a hidden card must be revealed
    MustFlip,
    /// Put a card taken from the discard pile back, must draw from the deck
    MustDrawFromDeck,
}

impl TurnState {
    pub fn has_drawn(&self) -> bool {
        !matches!(self, TurnState::Idle)
    }

    pub fn held_card(&self) -> Option<&CardFace> {
        match self {
            TurnState::Holding { card, .. } => Some(card),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pseudo: String,
    connection_id: String,
    hand: Option<Hand>,
    initial_reveals: u8,
    turn: TurnState,
}

impl Player {
    pub fn new(pseudo: impl Into<String>, connection_id: impl Into<String>) -> Self {
        Self {
            pseudo: pseudo.into(),
            connection_id: connection_id.into(),
            hand: None,
            initial_reveals: 0,
            turn: TurnState::Idle,
        }
    }

    pub fn pseudo(&self) -> &str {
        &self.pseudo
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// `None` until the host starts the game
    pub fn hand(&self) -> Option<&Hand> {
        self.hand.as_ref()
    }

    pub(crate) fn hand_mut(&mut self) -> Result<&mut Hand, GameError> {
        self.hand.as_mut().ok_or(GameError::GameNotStarted)
    }

    pub fn initial_reveals(&self) -> u8 {
        self.initial_reveals
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn has_drawn(&self) -> bool {
        self.turn.has_drawn()
    }

    pub fn just_discarded_drawn_card(&self) -> bool {
        self.turn == TurnState::MustFlip
    }

    pub fn is_fully_visible(&self) -> bool {
        self.hand.as_ref().is_some_and(Hand::is_fully_visible)
    }

    pub fn score(&self) -> i32 {
        self.hand.as_ref().map_or(0, Hand::score)
    }

    pub(crate) fn set_turn(&mut self, turn: TurnState) {
        self.turn = turn;
    }

    pub(crate) fn take_turn(&mut self) -> TurnState {
        std::mem::take(&mut self.turn)
    }

    pub(crate) fn record_initial_reveal(&mut self) {
        self.initial_reveals += 1;
    }

    fn view(&self) -> PlayerView {
        PlayerView {
            pseudo: self.pseudo.clone(),
            hand: self
                .hand
                .as_ref()
                .map(|hand| hand.cards().to_vec())
                .unwrap_or_default(),
        }
    }
}

/// One game session: its players in join (and turn) order, the shared deck
/// and discard pile, and the turn pointer
#[derive(Debug)]
pub struct Room {
    id: String,
    players: Vec<Player>,
    deck: Deck,
    discard_pile: Vec<Card>,
    current_turn: usize,
    phase: GamePhase,
    rng: StdRng,
    discard_serial: u64,
}

impl Room {
    pub fn new(id: impl Into<String>, host: Player, mut rng: StdRng) -> Self {
        let deck = Deck::initialize(&mut rng);
        Self::with_deck(id, host, deck, rng)
    }

    pub fn with_deck(id: impl Into<String>, host: Player, deck: Deck, rng: StdRng) -> Self {
        Self {
            id: id.into(),
            players: vec![host],
            deck,
            discard_pile: Vec::new(),
            current_turn: 0,
            phase: GamePhase::Lobby,
            rng,
            discard_serial: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, pseudo: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.pseudo == pseudo)
    }

    pub fn player_index(&self, pseudo: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.pseudo == pseudo)
            .ok_or_else(|| GameError::PlayerNotFound(pseudo.to_string()))
    }

    pub(crate) fn player_mut(&mut self, index: usize) -> &mut Player {
        &mut self.players[index]
    }

    pub fn pseudos(&self) -> Vec<String> {
        self.players.iter().map(|p| p.pseudo.clone()).collect()
    }

    /// First player in join order
    pub fn host(&self) -> Option<&Player> {
        self.players.first()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    pub fn current_turn(&self) -> usize {
        self.current_turn
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_turn)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn started(&self) -> bool {
        self.phase != GamePhase::Lobby
    }

    pub fn launched(&self) -> bool {
        matches!(
            self.phase,
            GamePhase::InProgress | GamePhase::LastRound | GamePhase::Finished
        )
    }

    pub fn last_round_triggered(&self) -> bool {
        matches!(self.phase, GamePhase::LastRound | GamePhase::Finished)
    }

    pub fn all_revealed_initial_cards(&self) -> bool {
        self.players
            .iter()
            .all(|p| p.initial_reveals >= INITIAL_REVEALS)
    }

    pub fn all_hands_visible(&self) -> bool {
        self.players.iter().all(Player::is_fully_visible)
    }

    /// Value copies of every hand, safe to ship to any client
    pub fn snapshot(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    pub(crate) fn add_player(&mut self, player: Player) {
        self.players.push(player);
    }

    /// Removes a player while keeping the turn pointer in range. The player
    /// who was next in order inherits the turn if the leaver held it.
    pub(crate) fn remove_player(&mut self, pseudo: &str) -> Option<Player> {
        let index = self.players.iter().position(|p| p.pseudo == pseudo)?;
        let player = self.players.remove(index);

        if index < self.current_turn {
            self.current_turn -= 1;
        }
        if self.current_turn >= self.players.len() {
            self.current_turn = 0;
        }
        Some(player)
    }

    /// Deals every player a hand and turns one card over to seed the discard pile
    pub(crate) fn deal(&mut self) -> Result<(), GameError> {
        let needed = self.players.len() * HAND_SIZE + 1;
        if self.deck.remaining_count() < needed {
            return Err(GameError::DeckExhausted);
        }

        for player in &mut self.players {
            player.hand = Some(Hand::deal(&mut self.deck, &player.pseudo)?);
            player.initial_reveals = 0;
            player.turn = TurnState::Idle;
        }
        let seed = self.deck.draw().ok_or(GameError::DeckExhausted)?;
        self.push_discard(seed);
        Ok(())
    }

    /// Draws from the deck, reshuffling the discard pile (all but its top
    /// card) back in when the deck has run dry
    pub(crate) fn draw_from_deck(&mut self) -> Option<CardFace> {
        if self.deck.is_empty() {
            if self.discard_pile.len() < 2 {
                return None;
            }
            let top = self.discard_pile.pop()?;
            let recycled: Vec<CardFace> = self.discard_pile.drain(..).map(|c| c.face()).collect();
            self.discard_pile.push(top);
            self.deck.refill(recycled, &mut self.rng);
        }
        self.deck.draw()
    }

    pub(crate) fn push_discard(&mut self, face: CardFace) {
        self.push_discard_as("discard", face);
    }

    pub(crate) fn push_burn(&mut self, face: CardFace) {
        self.push_discard_as("completed", face);
    }

    fn push_discard_as(&mut self, prefix: &str, face: CardFace) {
        self.discard_serial += 1;
        let id = format!("{}-{}", prefix, self.discard_serial);
        self.discard_pile.push(Card::face_up(id, face));
    }

    pub(crate) fn pop_discard(&mut self) -> Option<CardFace> {
        self.discard_pile.pop().map(|card| card.face())
    }

    /// Moves the turn pointer on and clears every player's turn state
    pub(crate) fn advance_turn(&mut self) {
        if self.players.is_empty() {
            return;
        }
        self.current_turn = (self.current_turn + 1) % self.players.len();
        self.reset_turns();
    }

    /// Hands the turn to the first player with a clean slate
    pub(crate) fn restart_turns(&mut self) {
        self.current_turn = 0;
        self.reset_turns();
    }

    pub(crate) fn reset_turns(&mut self) {
        for player in &mut self.players {
            player.turn = TurnState::Idle;
        }
    }
}
