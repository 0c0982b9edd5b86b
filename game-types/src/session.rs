use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{PoolFilters, TaskType};

pub type SessionId = Uuid;
pub type PlayerId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SessionStatus {
    Waiting,
    InProgress,
    Completed,
    Ended,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Ended)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Waiting => "waiting",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Ended => "ended",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "waiting" => Some(SessionStatus::Waiting),
            "in_progress" => Some(SessionStatus::InProgress),
            "completed" => Some(SessionStatus::Completed),
            "ended" => Some(SessionStatus::Ended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RaceMode {
    /// First player through every segment wins
    Segments,
    /// Most segments cleared before the clock runs out wins
    Timed,
}

/// Mode-specific configuration carried by a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "mode", rename_all = "snake_case")]
#[ts(export)]
pub enum GameMode {
    GenderDuel {
        #[serde(default)]
        filters: PoolFilters,
    },
    VerbSlot {
        category_id: Option<i32>,
        #[serde(default)]
        filters: PoolFilters,
    },
    Derby {
        race_mode: RaceMode,
        duration_seconds: u32,
        segments: u32,
        task_types: Vec<TaskType>,
        #[serde(default)]
        filters: PoolFilters,
    },
    WordSearch {
        category_id: Option<i32>,
        grid_size: u32,
        word_count: u32,
        #[serde(default)]
        filters: PoolFilters,
    },
    MemoryTranslation {
        pair_count: u32,
        #[serde(default)]
        filters: PoolFilters,
    },
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::GenderDuel { .. } => "gender_duel",
            GameMode::VerbSlot { .. } => "verb_slot",
            GameMode::Derby { .. } => "derby",
            GameMode::WordSearch { .. } => "word_search",
            GameMode::MemoryTranslation { .. } => "memory_translation",
        }
    }

    /// Pool filters with the mode's category folded in
    pub fn pool_filters(&self) -> PoolFilters {
        match self {
            GameMode::GenderDuel { filters }
            | GameMode::Derby { filters, .. }
            | GameMode::MemoryTranslation { filters, .. } => filters.clone(),
            GameMode::VerbSlot {
                category_id,
                filters,
            }
            | GameMode::WordSearch {
                category_id,
                filters,
                ..
            } => PoolFilters {
                category_id: category_id.or(filters.category_id),
                ..filters.clone()
            },
        }
    }

    /// Task mix used when the mode is driven by prompts
    pub fn task_types(&self) -> Vec<TaskType> {
        match self {
            GameMode::GenderDuel { .. } => vec![TaskType::ArticleGender],
            GameMode::VerbSlot { .. } => vec![TaskType::VerbConjugation],
            GameMode::Derby { task_types, .. } if !task_types.is_empty() => task_types.clone(),
            GameMode::Derby { .. } => vec![
                TaskType::ArticleGender,
                TaskType::Translation,
                TaskType::VerbConjugation,
            ],
            GameMode::WordSearch { .. } | GameMode::MemoryTranslation { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub user_id: Option<Uuid>,
    pub display_name: String,
    pub score: i32,
    pub is_ready: bool,
    pub progress: u32,
    pub moves: u32,
    pub time_ms: Option<u64>,
    pub joined_at: String, // ISO 8601 string
}

impl Player {
    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Who is calling into a session operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Identity {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub is_guest: bool,
}

impl Identity {
    pub fn user(id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: Some(display_name.into()),
            is_guest: false,
        }
    }

    pub fn guest(id: Uuid) -> Self {
        Self {
            id,
            display_name: None,
            is_guest: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSession {
    pub language_pair_id: i32,
    pub max_players: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub mode: GameMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionState {
    pub id: SessionId,
    pub status: SessionStatus,
    pub max_players: u32,
    pub difficulty: Difficulty,
    pub language_pair_id: i32,
    pub creator_id: PlayerId,
    pub mode: GameMode,
    pub players: Vec<Player>,
    pub seed: u64,
    pub generation: u32,
    pub created_at: String, // ISO 8601 string
}

impl SessionState {
    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn is_member(&self, player_id: PlayerId) -> bool {
        self.player(player_id).is_some()
    }

    pub fn is_single_player(&self) -> bool {
        self.max_players <= 1
    }
}
