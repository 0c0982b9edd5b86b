use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Rejected session operations. Never corrupts session state and is only
/// reported to the caller that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum GameError {
    #[error("Session {session_id} not found")]
    SessionNotFound { session_id: String },
    #[error("Player {player_id} is not part of this session")]
    PlayerNotFound { player_id: String },
    #[error("Session is full ({max_players} players)")]
    SessionFull { max_players: u32 },
    #[error("You have already joined this session")]
    AlreadyJoined,
    #[error("Session uses a different language pair")]
    LanguagePairMismatch,
    #[error("Language pair {language_pair_id} not found")]
    LanguagePairNotFound { language_pair_id: i32 },
    #[error("Only the session creator can do that")]
    NotSessionCreator,
    #[error("Session has ended")]
    SessionEnded,
    #[error("Operation not allowed while session is {current_state}")]
    InvalidGameState { current_state: String },
    #[error("Already answered this round")]
    AlreadyAnswered,
    #[error("Selection is not a straight line of letters")]
    InvalidSelection,
    #[error("Card {card_id} cannot be flipped")]
    InvalidCard { card_id: u32 },
    #[error("It is not your turn")]
    NotYourTurn,
    #[error("Invalid session configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

