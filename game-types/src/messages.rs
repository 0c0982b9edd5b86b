use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    GameError, GridPosition, Identity, MemorySnapshot, Prompt, SessionEvent, SessionState,
    WordSearchSnapshot,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    Authenticate { token: String },
    Subscribe { session_id: String },
    Unsubscribe,
    Ready,
    Leave,
    SubmitAnswer { round: u32, answer: String },
    SelectCells { start: GridPosition, end: GridPosition },
    FlipCard { card_id: u32 },
    Heartbeat,
}

/// Gameplay state a client needs to render the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum PlaySnapshot {
    Quiz { prompts: Vec<Prompt>, current_round: u32 },
    WordSearch { grid: WordSearchSnapshot },
    Memory { board: MemorySnapshot },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    AuthenticationSuccess { identity: Identity },
    AuthenticationFailed { reason: String },
    Subscribed { state: SessionState, play: Option<PlaySnapshot> },
    Unsubscribed,
    SessionEvent { session_id: String, event: SessionEvent },
    Rejected { error: GameError },
    Error { message: String },
}
