// Public API
pub use cards::{Card, CardFace};
pub use deck::Deck;
pub use engine::{GameAction, GameEngine};
pub use errors::{ErrorKind, GameError};
pub use events::{resolve, Delivery, Outbound, PlayerResult, PlayerView, Recipients, ServerEvent};
pub use hand::Hand;
pub use room::{DrawSource, GamePhase, Player, Room, TurnState};

// Internal modules
mod cards;
mod deck;
mod engine;
mod errors;
mod events;
mod hand;
mod room;
