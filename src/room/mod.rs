// Public API - what other modules can use
pub use handlers::{get_room, list_rooms};
pub use registry::{Admission, RegistryError, RoomRegistry, SharedRoom};
pub use types::RoomSummary;

// Internal modules
mod handlers;
mod registry;
mod types;
