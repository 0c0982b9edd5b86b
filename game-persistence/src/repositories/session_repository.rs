use anyhow::{anyhow, Result};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{game_players, game_sessions, prelude::*};
use game_types::{Difficulty, Player, SessionId, SessionState, SessionStatus};

/// Stores session rows and their player rows together
#[derive(Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn parse_timestamp(value: &str) -> sea_orm::prelude::DateTimeWithTimeZone {
        chrono::DateTime::parse_from_rfc3339(value).unwrap_or_else(|error| {
            warn!("Unparsable timestamp '{}' ({}), storing the current time", value, error);
            chrono::Utc::now().into()
        })
    }

    fn model_to_player(model: game_players::Model) -> Player {
        Player {
            id: model.player_id,
            user_id: model.user_id,
            display_name: model.display_name,
            score: model.score,
            is_ready: model.is_ready,
            progress: model.progress.max(0) as u32,
            moves: model.moves.max(0) as u32,
            time_ms: model.time_ms.map(|t| t.max(0) as u64),
            joined_at: model.joined_at.to_rfc3339(),
        }
    }

    fn model_to_state(model: game_sessions::Model, players: Vec<Player>) -> Result<SessionState> {
        Ok(SessionState {
            id: model.id,
            status: SessionStatus::parse(&model.status)
                .ok_or_else(|| anyhow!("Unknown session status '{}'", model.status))?,
            max_players: model.max_players.max(0) as u32,
            difficulty: Difficulty::parse(&model.difficulty)
                .ok_or_else(|| anyhow!("Unknown difficulty '{}'", model.difficulty))?,
            language_pair_id: model.language_pair_id,
            creator_id: model.creator_id,
            mode: serde_json::from_str(&model.mode)?,
            players,
            seed: model.seed as u64,
            generation: model.generation.max(0) as u32,
            created_at: model.created_at.to_rfc3339(),
        })
    }

    /// Upsert the session and replace its players in one transaction
    pub async fn save(&self, state: &SessionState) -> Result<()> {
        let txn = self.db.begin().await?;
        Self::save_in(&txn, state).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn save_in(txn: &DatabaseTransaction, state: &SessionState) -> Result<()> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let session = game_sessions::ActiveModel {
            id: Set(state.id),
            status: Set(state.status.as_str().to_string()),
            max_players: Set(state.max_players as i32),
            difficulty: Set(state.difficulty.as_str().to_string()),
            language_pair_id: Set(state.language_pair_id),
            creator_id: Set(state.creator_id),
            mode: Set(serde_json::to_string(&state.mode)?),
            seed: Set(state.seed as i64),
            generation: Set(state.generation as i32),
            created_at: Set(Self::parse_timestamp(&state.created_at)),
            updated_at: Set(now),
        };

        if GameSessions::find_by_id(state.id).one(txn).await?.is_some() {
            GameSessions::update(session).exec(txn).await?;
        } else {
            GameSessions::insert(session).exec(txn).await?;
        }

        GamePlayers::delete_many()
            .filter(game_players::Column::SessionId.eq(state.id))
            .exec(txn)
            .await?;

        if !state.players.is_empty() {
            let players = state.players.iter().map(|p| game_players::ActiveModel {
                id: NotSet,
                session_id: Set(state.id),
                player_id: Set(p.id),
                user_id: Set(p.user_id),
                display_name: Set(p.display_name.clone()),
                score: Set(p.score),
                is_ready: Set(p.is_ready),
                progress: Set(p.progress as i32),
                moves: Set(p.moves as i32),
                time_ms: Set(p.time_ms.map(|t| t as i64)),
                joined_at: Set(Self::parse_timestamp(&p.joined_at)),
            });
            GamePlayers::insert_many(players).exec(txn).await?;
        }

        Ok(())
    }

    pub async fn find(&self, session_id: SessionId) -> Result<Option<SessionState>> {
        let Some(model) = GameSessions::find_by_id(session_id).one(&self.db).await? else {
            return Ok(None);
        };

        let players = self.players_for(session_id).await?;
        Self::model_to_state(model, players).map(Some)
    }

    /// Waiting sessions for a language pair, newest first
    pub async fn find_open(&self, language_pair_id: i32) -> Result<Vec<SessionState>> {
        let models = GameSessions::find()
            .filter(game_sessions::Column::Status.eq(SessionStatus::Waiting.as_str()))
            .filter(game_sessions::Column::LanguagePairId.eq(language_pair_id))
            .order_by_desc(game_sessions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut sessions = Vec::with_capacity(models.len());
        for model in models {
            let players = self.players_for(model.id).await?;
            sessions.push(Self::model_to_state(model, players)?);
        }
        Ok(sessions)
    }

    pub async fn delete(&self, session_id: Uuid) -> Result<bool> {
        let txn = self.db.begin().await?;
        GamePlayers::delete_many()
            .filter(game_players::Column::SessionId.eq(session_id))
            .exec(&txn)
            .await?;
        let result = GameSessions::delete_by_id(session_id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn players_for(&self, session_id: SessionId) -> Result<Vec<Player>> {
        let models = GamePlayers::find()
            .filter(game_players::Column::SessionId.eq(session_id))
            .order_by_asc(game_players::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::model_to_player).collect())
    }
}
