use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GridPosition, Player, PlayerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub display_name: String,
    pub score: i32,
    pub progress: u32,
    pub moves: u32,
    pub time_ms: Option<u64>,
}

impl From<&Player> for PlayerScore {
    fn from(player: &Player) -> Self {
        PlayerScore {
            player_id: player.id,
            display_name: player.display_name.clone(),
            score: player.score,
            progress: player.progress,
            moves: player.moves,
            time_ms: player.time_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EndReason {
    /// Creator ended the session
    HostEnded,
    /// Too few players left mid-game, or the room emptied
    Abandoned,
    /// Gameplay ran to completion
    Finished,
}

/// Named events fanned out to every participant of a session.
/// Serialized as `{ "name": "player_joined", "payload": { .. } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "name", content = "payload", rename_all = "snake_case")]
#[ts(export)]
pub enum SessionEvent {
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: PlayerId,
        remaining: u32,
    },
    PlayerReady {
        player_id: PlayerId,
        ready_count: u32,
        player_count: u32,
    },
    GameStarted {
        players: Vec<Player>,
    },
    NextRound {
        round: u32,
        player_id: Option<PlayerId>,
        scores: Vec<PlayerScore>,
    },
    GameEnded {
        reason: EndReason,
        winner: Option<PlayerId>,
        final_scores: Vec<PlayerScore>,
    },
    GameRestarted {
        generation: u32,
        seed: u64,
    },
    WordFound {
        player_id: PlayerId,
        word: String,
        cells: Vec<GridPosition>,
        score: i32,
    },
    CardFlipped {
        player_id: PlayerId,
        card_id: u32,
        face: String,
    },
    PairMatched {
        player_id: PlayerId,
        pair_id: u32,
        card_ids: Vec<u32>,
        score: i32,
    },
    CardsHidden {
        card_ids: Vec<u32>,
        next_turn: Option<PlayerId>,
    },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::PlayerJoined { .. } => "player_joined",
            SessionEvent::PlayerLeft { .. } => "player_left",
            SessionEvent::PlayerReady { .. } => "player_ready",
            SessionEvent::GameStarted { .. } => "game_started",
            SessionEvent::NextRound { .. } => "next_round",
            SessionEvent::GameEnded { .. } => "game_ended",
            SessionEvent::GameRestarted { .. } => "game_restarted",
            SessionEvent::WordFound { .. } => "word_found",
            SessionEvent::CardFlipped { .. } => "card_flipped",
            SessionEvent::PairMatched { .. } => "pair_matched",
            SessionEvent::CardsHidden { .. } => "cards_hidden",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_event_wire_name_matches_name() {
        let event = SessionEvent::PlayerLeft {
            player_id: Uuid::new_v4(),
            remaining: 1,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], event.name());
        assert_eq!(json["payload"]["remaining"], 1);
    }

    #[test]
    fn test_game_ended_serialization() {
        let event = SessionEvent::GameEnded {
            reason: EndReason::Abandoned,
            winner: None,
            final_scores: Vec::new(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "game_ended");
        assert_eq!(json["payload"]["reason"], "abandoned");
    }
}
