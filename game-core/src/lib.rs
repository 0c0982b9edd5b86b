pub mod cleanup;
pub mod memory;
pub mod pool;
pub mod prompts;
pub mod scoring;
pub mod session;
pub mod word_search;

// Re-export main components
pub use cleanup::*;
pub use memory::*;
pub use pool::*;
pub use prompts::*;
pub use scoring::*;
pub use session::*;
pub use word_search::*;
