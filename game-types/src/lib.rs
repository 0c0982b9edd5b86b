pub mod board;
pub mod errors;
pub mod events;
pub mod messages;
pub mod prompt;
pub mod session;
pub mod vocabulary;

// Re-export all types
pub use board::*;
pub use errors::*;
pub use events::*;
pub use messages::*;
pub use prompt::*;
pub use session::*;
pub use vocabulary::*;
