use strum_macros::Display;

/// Broad classes of rejected intents
///
/// Every class is recoverable: the offending intent is dropped, the room
/// state is left untouched and only the sender is told about it (protocol
/// errors are only logged).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Protocol,
    IllegalAction,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Not in a room")]
    NoSession,
    #[error("Cannot act on behalf of {0}")]
    ActingForOtherPlayer(String),

    #[error("Player {0} is not in this room")]
    PlayerNotFound(String),
    #[error("Card {0} is not in your hand")]
    CardNotFound(String),
    #[error("Column {0} does not exist")]
    InvalidColumn(usize),

    #[error("Only the host can start the game")]
    NotHost,
    #[error("A game needs 2 to 4 players, this room has {0}")]
    PlayerCount(usize),
    #[error("The game has already started")]
    GameAlreadyStarted,
    #[error("The game has not started yet")]
    GameNotStarted,
    #[error("Every player must reveal two cards first")]
    GameNotLaunched,
    #[error("The game is over")]
    GameFinished,
    #[error("You have already revealed your two starting cards")]
    InitialRevealDone,
    #[error("It is not your turn")]
    NotYourTurn,
    #[error("You have already drawn a card this turn")]
    AlreadyDrawn,
    #[error("You must draw a card first")]
    MustDrawFirst,
    #[error("You must draw from the deck")]
    MustDrawFromDeck,
    #[error("You must reveal a card from your hand")]
    MustFlipCard,
    #[error("You must replace a card or discard the one you hold")]
    HoldingCard,
    #[error("You are not holding a drawn card")]
    NoHeldCard,
    #[error("Card {0} is already visible")]
    CardAlreadyVisible(String),
    #[error("Column {0} is not a visible set of identical cards")]
    ColumnNotComplete(usize),
    #[error("The deck is exhausted")]
    DeckExhausted,
    #[error("The discard pile is empty")]
    DiscardPileEmpty,
    #[error("Card value {0} is outside the deck range")]
    InvalidCardValue(i8),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NoSession => ErrorKind::Protocol,
            GameError::PlayerNotFound(_)
            | GameError::CardNotFound(_)
            | GameError::InvalidColumn(_) => ErrorKind::NotFound,
            _ => ErrorKind::IllegalAction,
        }
    }
}
