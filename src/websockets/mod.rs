// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::{websocket_handler, GameGateway};
pub use messages::{encode, ClientIntent, Routed};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod connection_manager;
mod handler;
mod messages;
mod socket;
