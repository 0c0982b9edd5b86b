pub mod session_repository;
pub mod vocabulary_repository;

pub use session_repository::SessionRepository;
pub use vocabulary_repository::VocabularyRepository;
