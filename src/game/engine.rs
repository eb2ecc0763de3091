//! Authoritative state machine for a room.
//!
//! Every action is validated against the room before anything is mutated, so
//! a rejected action leaves the room exactly as it was. Accepted actions
//! return the events to broadcast, in the order clients must see them.

use tracing::{debug, info, warn};

use super::errors::GameError;
use super::events::{Outbound, PlayerResult, ServerEvent};
use super::hand::COLUMNS;
use super::room::{
    DrawSource, GamePhase, Room, TurnState, INITIAL_REVEALS, MAX_PLAYERS, MIN_PLAYERS,
};

/// A typed in-room action, already attributed to the acting player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameAction {
    StartGame,
    FlipCard { card_id: String },
    DrawCard,
    DrawFromDiscard,
    /// `claimed_from_discard` is the client's belief about where the held
    /// card came from; the server's own record wins
    DiscardDrawnCard { claimed_from_discard: Option<bool> },
    ReplaceCard { old_card_id: String },
    ColumnCompleted { column: usize },
    Chat { message: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GameEngine;

impl GameEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        room: &mut Room,
        pseudo: &str,
        action: GameAction,
    ) -> Result<Vec<Outbound>, GameError> {
        room.player_index(pseudo)?;
        debug!(room_id = %room.id(), pseudo = %pseudo, action = ?action, "Applying action");

        match action {
            GameAction::StartGame => start_game(room, pseudo),
            GameAction::FlipCard { card_id } => match room.phase() {
                GamePhase::Lobby => Err(GameError::GameNotStarted),
                GamePhase::Dealt => initial_flip(room, pseudo, &card_id),
                GamePhase::InProgress | GamePhase::LastRound => turn_flip(room, pseudo, &card_id),
                GamePhase::Finished => Err(GameError::GameFinished),
            },
            GameAction::DrawCard => draw_card(room, pseudo),
            GameAction::DrawFromDiscard => draw_from_discard(room, pseudo),
            GameAction::DiscardDrawnCard {
                claimed_from_discard,
            } => discard_drawn_card(room, pseudo, claimed_from_discard),
            GameAction::ReplaceCard { old_card_id } => replace_card(room, pseudo, &old_card_id),
            GameAction::ColumnCompleted { column } => column_completed(room, pseudo, column),
            GameAction::Chat { message } => Ok(vec![Outbound::room(ServerEvent::Message {
                message: format!("{}: {}", pseudo, message),
            })]),
        }
    }

    /// Drops a disconnected player and re-evaluates whatever the remaining
    /// players were waiting on
    pub fn player_left(&self, room: &mut Room, pseudo: &str) -> Vec<Outbound> {
        let was_current = room
            .current_player()
            .is_some_and(|p| p.pseudo() == pseudo);
        let Some(mut player) = room.remove_player(pseudo) else {
            return Vec::new();
        };

        info!(
            room_id = %room.id(),
            pseudo = %pseudo,
            remaining = room.players().len(),
            "Player left room"
        );
        if room.is_empty() {
            return Vec::new();
        }

        // A card in hand would otherwise vanish from the game
        if let TurnState::Holding { card, .. } = player.take_turn() {
            room.push_discard(card);
        }

        let mut events = vec![Outbound::room(ServerEvent::PlayerLeft {
            players: room.pseudos(),
        })];

        match room.phase() {
            GamePhase::Dealt if room.all_revealed_initial_cards() => {
                events.push(launch(room));
            }
            GamePhase::LastRound if room.all_hands_visible() => {
                events.push(finish(room));
            }
            GamePhase::InProgress | GamePhase::LastRound if was_current => {
                room.reset_turns();
                events.push(Outbound::room(ServerEvent::next_turn(room)));
            }
            _ => {}
        }
        events
    }
}

fn start_game(room: &mut Room, pseudo: &str) -> Result<Vec<Outbound>, GameError> {
    if room.started() {
        return Err(GameError::GameAlreadyStarted);
    }
    if room.host().map(|host| host.pseudo()) != Some(pseudo) {
        return Err(GameError::NotHost);
    }
    let count = room.players().len();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
        return Err(GameError::PlayerCount(count));
    }

    room.deal()?;
    room.set_phase(GamePhase::Dealt);

    info!(
        room_id = %room.id(),
        players = count,
        deck_size = room.deck().remaining_count(),
        "Game started"
    );
    Ok(vec![Outbound::room(ServerEvent::game_started(room))])
}

fn initial_flip(room: &mut Room, pseudo: &str, card_id: &str) -> Result<Vec<Outbound>, GameError> {
    let index = room.player_index(pseudo)?;
    let player = &room.players()[index];
    if player.initial_reveals() >= INITIAL_REVEALS {
        return Err(GameError::InitialRevealDone);
    }
    let hand = player.hand().ok_or(GameError::GameNotStarted)?;
    let card = hand
        .get(card_id)
        .ok_or_else(|| GameError::CardNotFound(card_id.to_string()))?;
    if card.is_visible() {
        return Err(GameError::CardAlreadyVisible(card_id.to_string()));
    }

    let player = room.player_mut(index);
    player.hand_mut()?.reveal(card_id)?;
    player.record_initial_reveal();

    let mut events = vec![Outbound::room(flipped_event(room, index, card_id)?)];
    if room.all_revealed_initial_cards() {
        events.push(launch(room));
    }
    Ok(events)
}

fn turn_flip(room: &mut Room, pseudo: &str, card_id: &str) -> Result<Vec<Outbound>, GameError> {
    let index = require_turn(room, pseudo)?;
    let player = &room.players()[index];
    match player.turn() {
        TurnState::MustFlip => {}
        TurnState::Idle => return Err(GameError::MustDrawFirst),
        TurnState::Holding { .. } => return Err(GameError::HoldingCard),
        TurnState::MustDrawFromDeck => return Err(GameError::MustDrawFromDeck),
    }

    // Re-flipping a visible card is harmless and still ends the turn
    let was_hidden = room.player_mut(index).hand_mut()?.reveal(card_id)?;
    if !was_hidden {
        debug!(room_id = %room.id(), pseudo = %pseudo, card_id = %card_id, "Redundant flip");
    }
    let player = room.player_mut(index);
    player.set_turn(TurnState::Idle);

    let mut events = vec![Outbound::room(flipped_event(room, index, card_id)?)];
    events.extend(end_turn(room, index));
    Ok(events)
}

fn draw_card(room: &mut Room, pseudo: &str) -> Result<Vec<Outbound>, GameError> {
    require_launched(room)?;
    let index = require_turn(room, pseudo)?;
    match room.players()[index].turn() {
        TurnState::Idle | TurnState::MustDrawFromDeck => {}
        TurnState::MustFlip => return Err(GameError::MustFlipCard),
        TurnState::Holding { .. } => return Err(GameError::AlreadyDrawn),
    }

    let card = room.draw_from_deck().ok_or(GameError::DeckExhausted)?;
    room.player_mut(index).set_turn(TurnState::Holding {
        card: card.clone(),
        source: DrawSource::Deck,
    });

    debug!(room_id = %room.id(), pseudo = %pseudo, value = card.value, "Card drawn from deck");
    Ok(vec![Outbound::room(ServerEvent::CardDrawn {
        player: pseudo.to_string(),
        card,
        deck_size: room.deck().remaining_count(),
        discard_pile: room.discard_pile().to_vec(),
    })])
}

fn draw_from_discard(room: &mut Room, pseudo: &str) -> Result<Vec<Outbound>, GameError> {
    require_launched(room)?;
    if room.discard_pile().is_empty() {
        return Err(GameError::DiscardPileEmpty);
    }
    let index = require_turn(room, pseudo)?;
    match room.players()[index].turn() {
        TurnState::Idle => {}
        TurnState::MustDrawFromDeck => return Err(GameError::MustDrawFromDeck),
        TurnState::MustFlip => return Err(GameError::MustFlipCard),
        TurnState::Holding { .. } => return Err(GameError::AlreadyDrawn),
    }

    let card = room.pop_discard().ok_or(GameError::DiscardPileEmpty)?;
    room.player_mut(index).set_turn(TurnState::Holding {
        card: card.clone(),
        source: DrawSource::Discard,
    });

    debug!(room_id = %room.id(), pseudo = %pseudo, value = card.value, "Card drawn from discard");
    Ok(vec![Outbound::room(ServerEvent::CardDrawnFromDiscard {
        player: pseudo.to_string(),
        card,
        deck_size: room.deck().remaining_count(),
        discard_pile: room.discard_pile().to_vec(),
    })])
}

fn discard_drawn_card(
    room: &mut Room,
    pseudo: &str,
    claimed_from_discard: Option<bool>,
) -> Result<Vec<Outbound>, GameError> {
    require_launched(room)?;
    let index = require_turn(room, pseudo)?;
    let TurnState::Holding { card, source } = room.players()[index].turn().clone() else {
        return Err(GameError::NoHeldCard);
    };

    let from_discard = source == DrawSource::Discard;
    if claimed_from_discard.is_some_and(|claimed| claimed != from_discard) {
        warn!(
            room_id = %room.id(),
            pseudo = %pseudo,
            claimed = ?claimed_from_discard,
            from_discard,
            "Client disagrees about the held card's origin"
        );
    }

    room.push_discard(card);
    room.player_mut(index).set_turn(if from_discard {
        TurnState::MustDrawFromDeck
    } else {
        TurnState::MustFlip
    });

    Ok(vec![Outbound::room(ServerEvent::DrawnCardDiscarded {
        deck_size: room.deck().remaining_count(),
        discard_pile: room.discard_pile().to_vec(),
        from_discard,
    })])
}

fn replace_card(room: &mut Room, pseudo: &str, old_card_id: &str) -> Result<Vec<Outbound>, GameError> {
    require_launched(room)?;
    let index = require_turn(room, pseudo)?;
    let card = room.players()[index]
        .turn()
        .held_card()
        .cloned()
        .ok_or(GameError::NoHeldCard)?;

    let player = room.player_mut(index);
    let displaced = player.hand_mut()?.replace(old_card_id, card)?;
    player.set_turn(TurnState::Idle);
    room.push_discard(displaced.face());

    debug!(
        room_id = %room.id(),
        pseudo = %pseudo,
        card_id = %old_card_id,
        discarded = displaced.value(),
        "Card replaced"
    );
    let mut events = vec![Outbound::room(ServerEvent::CardReplaced {
        player: pseudo.to_string(),
        card_id: old_card_id.to_string(),
        players: room.snapshot(),
        deck_size: room.deck().remaining_count(),
        discard_pile: room.discard_pile().to_vec(),
    })];
    events.extend(end_turn(room, index));
    Ok(events)
}

fn column_completed(room: &mut Room, pseudo: &str, column: usize) -> Result<Vec<Outbound>, GameError> {
    require_launched(room)?;
    if column >= COLUMNS {
        return Err(GameError::InvalidColumn(column));
    }
    let index = room.player_index(pseudo)?;

    let Some(burned) = room.player_mut(index).hand_mut()?.complete_column(column)? else {
        debug!(room_id = %room.id(), pseudo = %pseudo, column, "Column already completed");
        return Ok(Vec::new());
    };

    let completed_value = burned.value;
    room.push_burn(burned);
    info!(room_id = %room.id(), pseudo = %pseudo, column, completed_value, "Column completed");

    Ok(vec![Outbound::room(ServerEvent::ColumnUpdate {
        players: room.snapshot(),
        discard_pile: room.discard_pile().to_vec(),
        completed_value,
    })])
}

/// Wraps up the acting player's turn: last-round trigger, forced reveal,
/// game over, or hand-off to the next player
fn end_turn(room: &mut Room, index: usize) -> Vec<Outbound> {
    let mut events = Vec::new();
    let pseudo = room.players()[index].pseudo().to_string();

    if !room.last_round_triggered() && room.players()[index].is_fully_visible() {
        room.set_phase(GamePhase::LastRound);
        info!(room_id = %room.id(), pseudo = %pseudo, "Last round triggered");
        events.push(Outbound::room(ServerEvent::LastRound {
            message: format!("{} revealed all their cards, this is the last round!", pseudo),
        }));
    }

    if room.last_round_triggered() {
        if let Ok(hand) = room.player_mut(index).hand_mut() {
            hand.reveal_all();
        }
        if room.all_hands_visible() {
            events.push(finish(room));
            return events;
        }
    }

    room.advance_turn();
    events.push(Outbound::room(ServerEvent::next_turn(room)));
    events
}

fn launch(room: &mut Room) -> Outbound {
    room.set_phase(GamePhase::InProgress);
    room.restart_turns();
    info!(room_id = %room.id(), "All initial cards revealed, game launched");
    Outbound::room(ServerEvent::game_launched(room))
}

/// Scores every hand. Ties go to the earliest player in turn order.
fn finish(room: &mut Room) -> Outbound {
    room.set_phase(GamePhase::Finished);

    let results: Vec<PlayerResult> = room
        .players()
        .iter()
        .map(|p| PlayerResult {
            pseudo: p.pseudo().to_string(),
            score: p.score(),
            hand: p.hand().map(|h| h.cards().to_vec()).unwrap_or_default(),
        })
        .collect();

    // min_by_key keeps the first of several equal minima
    let (winner, score) = results
        .iter()
        .min_by_key(|r| r.score)
        .map(|r| (r.pseudo.clone(), r.score))
        .unwrap_or_default();

    info!(room_id = %room.id(), winner = %winner, score, "Game over");
    Outbound::room(ServerEvent::GameOver {
        message: format!("{} wins with a score of {}!", winner, score),
        winner,
        results,
    })
}

fn flipped_event(room: &Room, index: usize, card_id: &str) -> Result<ServerEvent, GameError> {
    let player = &room.players()[index];
    let card = player
        .hand()
        .and_then(|hand| hand.get(card_id))
        .ok_or_else(|| GameError::CardNotFound(card_id.to_string()))?;
    Ok(ServerEvent::card_flipped(room, player.pseudo(), card))
}

fn require_launched(room: &Room) -> Result<(), GameError> {
    match room.phase() {
        GamePhase::Lobby => Err(GameError::GameNotStarted),
        GamePhase::Dealt => Err(GameError::GameNotLaunched),
        GamePhase::InProgress | GamePhase::LastRound => Ok(()),
        GamePhase::Finished => Err(GameError::GameFinished),
    }
}

fn require_turn(room: &Room, pseudo: &str) -> Result<usize, GameError> {
    let index = room.player_index(pseudo)?;
    if index != room.current_turn() {
        return Err(GameError::NotYourTurn);
    }
    Ok(index)
}
