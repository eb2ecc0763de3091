use serde::Serialize;

use super::cards::{Card, CardFace};
use super::deck::Deck;
use super::errors::GameError;

pub const HAND_SIZE: usize = 12;
pub const COLUMNS: usize = 4;
pub const ROWS: usize = 3;

/// A player's 4x3 grid. Slot `i` sits in column `i / 3`, row `i % 3`.
///
/// The grid never changes shape once dealt, only the contents of its cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// Draws `HAND_SIZE` cards face down, ids are `<pseudo>-<slot>`.
    /// Leaves the deck untouched when it cannot cover a full hand.
    pub fn deal(deck: &mut Deck, pseudo: &str) -> Result<Self, GameError> {
        if deck.remaining_count() < HAND_SIZE {
            return Err(GameError::DeckExhausted);
        }

        let mut faces = Vec::with_capacity(HAND_SIZE);
        while faces.len() < HAND_SIZE {
            faces.push(deck.draw().ok_or(GameError::DeckExhausted)?);
        }
        Ok(Self::from_faces(pseudo, faces))
    }

    fn from_faces(pseudo: &str, faces: Vec<CardFace>) -> Self {
        let cards = faces
            .into_iter()
            .enumerate()
            .map(|(slot, face)| Card::hidden(format!("{}-{}", pseudo, slot), face))
            .collect();
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == card_id)
    }

    fn position(&self, card_id: &str) -> Result<usize, GameError> {
        self.cards
            .iter()
            .position(|card| card.id() == card_id)
            .ok_or_else(|| GameError::CardNotFound(card_id.to_string()))
    }

    /// Turns the card face up. Returns whether it was hidden before.
    pub fn reveal(&mut self, card_id: &str) -> Result<bool, GameError> {
        let index = self.position(card_id)?;
        let card = &mut self.cards[index];
        let was_hidden = !card.is_visible();
        card.reveal();
        Ok(was_hidden)
    }

    /// Installs `face` face up in the slot of `card_id` and hands back the
    /// card that was there
    pub fn replace(&mut self, card_id: &str, face: CardFace) -> Result<Card, GameError> {
        let index = self.position(card_id)?;
        let incoming = Card::face_up(card_id.to_string(), face);
        Ok(std::mem::replace(&mut self.cards[index], incoming))
    }

    pub fn reveal_all(&mut self) {
        self.cards.iter_mut().for_each(Card::reveal);
    }

    pub fn is_fully_visible(&self) -> bool {
        self.cards.iter().all(Card::is_visible)
    }

    pub fn has_hidden(&self) -> bool {
        !self.is_fully_visible()
    }

    pub fn visible_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_visible()).count()
    }

    pub fn column(&self, column: usize) -> Result<&[Card], GameError> {
        if column >= COLUMNS {
            return Err(GameError::InvalidColumn(column));
        }
        Ok(&self.cards[column * ROWS..(column + 1) * ROWS])
    }

    /// Marks a column of three identical visible cards as completed.
    ///
    /// Returns the face to burn onto the discard pile, or `None` when the
    /// column was already completed.
    pub fn complete_column(&mut self, column: usize) -> Result<Option<CardFace>, GameError> {
        let cells = self.column(column)?;
        if cells.iter().all(Card::is_column_completed) {
            return Ok(None);
        }

        let first = &cells[0];
        let matching = cells
            .iter()
            .all(|card| card.is_visible() && card.value() == first.value());
        if !matching {
            return Err(GameError::ColumnNotComplete(column));
        }

        let burned = first.face();
        self.cards[column * ROWS..(column + 1) * ROWS]
            .iter_mut()
            .for_each(Card::mark_column_completed);
        Ok(Some(burned))
    }

    /// Sum of every card, face up or not
    pub fn score(&self) -> i32 {
        self.cards.iter().map(|card| i32::from(card.value())).sum()
    }
}
