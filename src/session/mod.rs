// Public API - what other modules can use
pub use models::Session;
pub use repository::{InMemorySessionRepository, SessionError, SessionRepository};

// Internal modules
mod models;
mod repository;
