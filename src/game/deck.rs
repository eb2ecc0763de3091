use rand::seq::SliceRandom;
use rand::Rng;

use super::cards::{CardFace, FACE_TABLE};

/// Draw pile. The last element of `units` is the top of the deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    units: Vec<CardFace>,
}

impl Deck {
    /// Builds the standard multiset from `FACE_TABLE` and shuffles it
    pub fn initialize<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let units = FACE_TABLE
            .iter()
            .flat_map(|&(value, count)| std::iter::repeat(CardFace::from_table(value)).take(count))
            .collect();

        let mut deck = Self { units };
        deck.shuffle(rng);
        deck
    }

    /// Deck in exactly the given order, last element drawn first
    pub fn from_faces(units: Vec<CardFace>) -> Self {
        Self { units }
    }

    /// Uniform Fisher-Yates shuffle of the remaining units
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.units.shuffle(rng);
    }

    /// Removes the top unit, `None` once the deck is exhausted
    pub fn draw(&mut self) -> Option<CardFace> {
        self.units.pop()
    }

    /// Puts cards back under the current units and reshuffles everything
    pub fn refill<R: Rng + ?Sized>(
        &mut self,
        faces: impl IntoIterator<Item = CardFace>,
        rng: &mut R,
    ) {
        self.units.extend(faces);
        self.shuffle(rng);
    }

    pub fn remaining_count(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Remaining units carrying `value`
    pub fn count_of(&self, value: i8) -> usize {
        self.units.iter().filter(|face| face.value == value).count()
    }
}
