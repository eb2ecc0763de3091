use serde::{Deserialize, Serialize};

use super::errors::GameError;

pub const MIN_VALUE: i8 = -2;
pub const MAX_VALUE: i8 = 12;

/// Face values of the standard deck and the number of copies of each
pub const FACE_TABLE: [(i8, usize); 15] = [
    (-2, 5),
    (-1, 10),
    (0, 15),
    (1, 10),
    (2, 10),
    (3, 10),
    (4, 10),
    (5, 10),
    (6, 10),
    (7, 10),
    (8, 10),
    (9, 10),
    (10, 10),
    (11, 10),
    (12, 10),
];

/// Total number of cards in a fresh deck
pub fn standard_deck_size() -> usize {
    FACE_TABLE.iter().map(|(_, count)| count).sum()
}

/// A single undealt card: its value and the image the client renders for it.
/// The image is opaque to the server and passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardFace {
    pub value: i8,
    pub image: String,
}

impl CardFace {
    pub fn new(value: i8) -> Result<Self, GameError> {
        if !(MIN_VALUE..=MAX_VALUE).contains(&value) {
            return Err(GameError::InvalidCardValue(value));
        }
        Ok(Self::from_table(value))
    }

    /// Values taken from `FACE_TABLE` are in range by construction
    pub(crate) fn from_table(value: i8) -> Self {
        Self {
            value,
            image: format!("/images/{}.png", value),
        }
    }
}

/// A card sitting in a hand or on the discard pile.
///
/// `id` is only unique within its container. Value and image never change
/// after the card is dealt; visibility and the column flag are flipped by the
/// engine only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    id: String,
    image: String,
    value: i8,
    visible: bool,
    #[serde(default)]
    column_completed: bool,
}

impl Card {
    pub fn hidden(id: String, face: CardFace) -> Self {
        Self {
            id,
            image: face.image,
            value: face.value,
            visible: false,
            column_completed: false,
        }
    }

    pub fn face_up(id: String, face: CardFace) -> Self {
        Self {
            visible: true,
            ..Self::hidden(id, face)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn value(&self) -> i8 {
        self.value
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_column_completed(&self) -> bool {
        self.column_completed
    }

    pub fn face(&self) -> CardFace {
        CardFace {
            value: self.value,
            image: self.image.clone(),
        }
    }

    pub(crate) fn reveal(&mut self) {
        self.visible = true;
    }

    pub(crate) fn mark_column_completed(&mut self) {
        self.column_completed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_table_values_in_range() {
        for (value, count) in FACE_TABLE {
            assert!((MIN_VALUE..=MAX_VALUE).contains(&value));
            assert!(count > 0);
        }
        assert_eq!(standard_deck_size(), 150);
    }

    #[test]
    fn test_card_face_rejects_out_of_range() {
        assert_eq!(CardFace::new(13), Err(GameError::InvalidCardValue(13)));
        assert_eq!(CardFace::new(-3), Err(GameError::InvalidCardValue(-3)));

        let face = CardFace::new(-2).unwrap();
        assert_eq!(face.image, "/images/-2.png");
    }

    #[test]
    fn test_card_serializes_camel_case() {
        let card = Card::hidden("alice-3".to_string(), CardFace::new(7).unwrap());
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["id"], "alice-3");
        assert_eq!(json["value"], 7);
        assert_eq!(json["visible"], false);
        assert_eq!(json["columnCompleted"], false);
        assert_eq!(json["image"], "/images/7.png");
    }
}
