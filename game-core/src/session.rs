use crate::ScoreUpdate;
use game_types::{
    CreateSession, EndReason, GameError, GameMode, Identity, Player, PlayerId, PlayerScore,
    SessionEvent, SessionId, SessionState, SessionStatus,
};
use rand::Rng;
use tracing::{debug, info};

/// Ready players needed to start a multiplayer session
pub const MULTIPLAYER_QUORUM: usize = 2;
pub const MIN_GRID_SIZE: u32 = 5;
pub const MAX_GRID_SIZE: u32 = 30;

pub type SessionResult = Result<Vec<SessionEvent>, GameError>;

/// Seed for grids and shuffles, derived from the session id and restart count
pub fn session_seed(session_id: SessionId, generation: u32) -> u64 {
    let (high, low) = session_id.as_u64_pair();
    high ^ low.rotate_left(17) ^ (generation as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

pub fn guest_display_name<R: Rng>(rng: &mut R) -> String {
    format!("Guest-{:04}", rng.gen_range(0..10_000))
}

/// Session lifecycle: waiting -> in_progress -> completed | ended.
/// The only way back to waiting is an explicit restart.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub state: SessionState,
    destroyed: bool,
}

impl GameSession {
    pub fn create(
        id: SessionId,
        request: CreateSession,
        creator: &Identity,
    ) -> Result<(Self, Vec<SessionEvent>), GameError> {
        Self::validate(&request)?;

        let state = SessionState {
            id,
            status: SessionStatus::Waiting,
            max_players: request.max_players,
            difficulty: request.difficulty,
            language_pair_id: request.language_pair_id,
            creator_id: creator.id,
            mode: request.mode,
            players: Vec::new(),
            seed: session_seed(id, 0),
            generation: 0,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let mut session = Self {
            state,
            destroyed: false,
        };
        let player = session.new_player(creator);
        session.state.players.push(player.clone());

        info!(
            "Created {} session {} for pair {}",
            session.state.mode.name(),
            id,
            session.state.language_pair_id
        );

        Ok((session, vec![SessionEvent::PlayerJoined { player }]))
    }

    pub fn from_state(state: SessionState) -> Self {
        Self {
            state,
            destroyed: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.state.id
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    /// True once the last player left a session that never started
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn quorum(&self) -> usize {
        if self.state.is_single_player() {
            1
        } else {
            MULTIPLAYER_QUORUM
        }
    }

    pub fn ready_count(&self) -> usize {
        self.state.players.iter().filter(|p| p.is_ready).count()
    }

    pub fn join(&mut self, identity: &Identity, language_pair_id: i32) -> SessionResult {
        self.ensure_not_ended()?;
        self.ensure_status(SessionStatus::Waiting)?;

        if self.state.players.len() >= self.state.max_players as usize {
            return Err(GameError::SessionFull {
                max_players: self.state.max_players,
            });
        }

        if self.state.language_pair_id != language_pair_id {
            return Err(GameError::LanguagePairMismatch);
        }

        if self.state.is_member(identity.id) {
            return Err(GameError::AlreadyJoined);
        }

        let player = self.new_player(identity);
        self.state.players.push(player.clone());

        debug!(
            "Player {} joined session {} ({}/{})",
            player.id,
            self.state.id,
            self.state.players.len(),
            self.state.max_players
        );

        Ok(vec![SessionEvent::PlayerJoined { player }])
    }

    pub fn ready(&mut self, player_id: PlayerId) -> SessionResult {
        self.ensure_not_ended()?;
        self.ensure_member(player_id)?;
        self.ensure_status(SessionStatus::Waiting)?;

        if let Some(player) = self.state.players.iter_mut().find(|p| p.id == player_id) {
            player.is_ready = true;
        }

        let mut events = vec![SessionEvent::PlayerReady {
            player_id,
            ready_count: self.ready_count() as u32,
            player_count: self.state.players.len() as u32,
        }];
        events.extend(self.start_if_quorum());

        Ok(events)
    }

    pub fn leave(&mut self, player_id: PlayerId) -> SessionResult {
        self.ensure_not_ended()?;
        self.ensure_member(player_id)?;

        self.state.players.retain(|p| p.id != player_id);
        let remaining = self.state.players.len();

        let mut events = vec![SessionEvent::PlayerLeft {
            player_id,
            remaining: remaining as u32,
        }];

        match self.state.status {
            SessionStatus::Waiting if remaining == 0 => {
                self.destroyed = true;
                events.push(self.transition_to_end(SessionStatus::Ended, EndReason::Abandoned, None));
            }
            SessionStatus::Waiting => {
                // Whoever was holding the room back may have been the one to leave
                events.extend(self.start_if_quorum());
            }
            SessionStatus::InProgress
                if remaining == 0 || (!self.state.is_single_player() && remaining < MULTIPLAYER_QUORUM) =>
            {
                info!(
                    "Session {} abandoned mid-game ({} players left)",
                    self.state.id, remaining
                );
                events.push(self.transition_to_end(SessionStatus::Ended, EndReason::Abandoned, None));
            }
            _ => {}
        }

        Ok(events)
    }

    /// Host-only: force the session to completed
    pub fn end(&mut self, caller: PlayerId) -> SessionResult {
        self.ensure_not_ended()?;
        self.ensure_creator(caller)?;

        if self.state.status == SessionStatus::Completed {
            return Err(self.invalid_state());
        }

        let winner = self.leader();
        Ok(vec![self.transition_to_end(
            SessionStatus::Completed,
            EndReason::HostEnded,
            winner,
        )])
    }

    /// Gameplay ran to its natural end
    pub fn complete(&mut self, winner: Option<PlayerId>) -> SessionResult {
        self.ensure_not_ended()?;
        self.ensure_status(SessionStatus::InProgress)?;

        Ok(vec![self.transition_to_end(
            SessionStatus::Completed,
            EndReason::Finished,
            winner,
        )])
    }

    /// Host-only: back to waiting with a fresh seed and cleared scores
    pub fn restart(&mut self, caller: PlayerId) -> SessionResult {
        self.ensure_not_ended()?;
        self.ensure_creator(caller)?;

        if self.state.status == SessionStatus::Waiting {
            return Err(self.invalid_state());
        }

        self.state.generation += 1;
        self.state.seed = session_seed(self.state.id, self.state.generation);
        self.state.status = SessionStatus::Waiting;

        for player in &mut self.state.players {
            player.is_ready = false;
            player.score = 0;
            player.progress = 0;
            player.moves = 0;
            player.time_ms = None;
        }

        info!(
            "Session {} restarted (generation {})",
            self.state.id, self.state.generation
        );

        Ok(vec![SessionEvent::GameRestarted {
            generation: self.state.generation,
            seed: self.state.seed,
        }])
    }

    /// Copy gameplay scores onto the players of a running session
    pub fn apply_scores(&mut self, updates: &[ScoreUpdate]) -> Result<(), GameError> {
        self.ensure_not_ended()?;
        self.ensure_status(SessionStatus::InProgress)?;

        for update in updates {
            if let Some(player) = self
                .state
                .players
                .iter_mut()
                .find(|p| p.id == update.player_id)
            {
                player.score = update.score;
                player.progress = update.progress;
                player.moves = update.moves;
                player.time_ms = update.time_ms;
            }
        }

        Ok(())
    }

    pub fn scores(&self) -> Vec<PlayerScore> {
        self.state.players.iter().map(PlayerScore::from).collect()
    }

    /// Highest scoring player; ties go to whoever joined first
    pub fn leader(&self) -> Option<PlayerId> {
        self.state
            .players
            .iter()
            .fold(None::<&Player>, |best, p| match best {
                Some(b) if b.score >= p.score => Some(b),
                _ => Some(p),
            })
            .map(|p| p.id)
    }

    fn start_if_quorum(&mut self) -> Vec<SessionEvent> {
        let players = &self.state.players;
        if self.state.status != SessionStatus::Waiting
            || players.len() < self.quorum()
            || !players.iter().all(|p| p.is_ready)
        {
            return Vec::new();
        }

        self.state.status = SessionStatus::InProgress;
        info!(
            "Session {} started with {} players",
            self.state.id,
            self.state.players.len()
        );

        vec![SessionEvent::GameStarted {
            players: self.state.players.clone(),
        }]
    }

    fn transition_to_end(
        &mut self,
        status: SessionStatus,
        reason: EndReason,
        winner: Option<PlayerId>,
    ) -> SessionEvent {
        self.state.status = status;
        SessionEvent::GameEnded {
            reason,
            winner,
            final_scores: self.scores(),
        }
    }

    fn new_player(&self, identity: &Identity) -> Player {
        let display_name = match (&identity.display_name, identity.is_guest) {
            (Some(name), _) if !name.trim().is_empty() => name.trim().to_string(),
            (_, true) => guest_display_name(&mut rand::thread_rng()),
            _ => "Player".to_string(),
        };

        Player {
            id: identity.id,
            user_id: if identity.is_guest {
                None
            } else {
                Some(identity.id)
            },
            display_name,
            score: 0,
            is_ready: false,
            progress: 0,
            moves: 0,
            time_ms: None,
            joined_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn validate(request: &CreateSession) -> Result<(), GameError> {
        let invalid = |reason: &str| {
            Err(GameError::InvalidConfiguration {
                reason: reason.to_string(),
            })
        };

        if request.max_players == 0 {
            return invalid("max_players must be at least 1");
        }

        match &request.mode {
            GameMode::Derby {
                segments,
                duration_seconds,
                ..
            } => {
                if *segments == 0 {
                    return invalid("derby needs at least one segment");
                }
                if *duration_seconds == 0 {
                    return invalid("derby duration must be positive");
                }
            }
            GameMode::WordSearch {
                grid_size,
                word_count,
                ..
            } => {
                if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(grid_size) {
                    return invalid("grid_size out of range");
                }
                if *word_count == 0 {
                    return invalid("word search needs at least one word");
                }
            }
            GameMode::MemoryTranslation { pair_count, .. } => {
                if *pair_count == 0 {
                    return invalid("memory needs at least one pair");
                }
            }
            GameMode::GenderDuel { .. } | GameMode::VerbSlot { .. } => {}
        }

        Ok(())
    }

    fn ensure_not_ended(&self) -> Result<(), GameError> {
        if self.state.status == SessionStatus::Ended {
            return Err(GameError::SessionEnded);
        }
        Ok(())
    }

    fn ensure_status(&self, expected: SessionStatus) -> Result<(), GameError> {
        if self.state.status != expected {
            return Err(self.invalid_state());
        }
        Ok(())
    }

    fn ensure_member(&self, player_id: PlayerId) -> Result<(), GameError> {
        if !self.state.is_member(player_id) {
            return Err(GameError::PlayerNotFound {
                player_id: player_id.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_creator(&self, caller: PlayerId) -> Result<(), GameError> {
        if self.state.creator_id != caller {
            return Err(GameError::NotSessionCreator);
        }
        Ok(())
    }

    fn invalid_state(&self) -> GameError {
        GameError::InvalidGameState {
            current_state: self.state.status.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_types::{Difficulty, PoolFilters};
    use uuid::Uuid;

    fn request(max_players: u32) -> CreateSession {
        CreateSession {
            language_pair_id: 1,
            max_players,
            difficulty: Difficulty::Easy,
            mode: GameMode::GenderDuel {
                filters: PoolFilters::default(),
            },
        }
    }

    fn host() -> Identity {
        Identity::user(Uuid::new_v4(), "Host")
    }

    #[test]
    fn test_seed_depends_on_generation() {
        let id = Uuid::new_v4();
        assert_eq!(session_seed(id, 0), session_seed(id, 0));
        assert_ne!(session_seed(id, 0), session_seed(id, 1));
    }

    #[test]
    fn test_guest_gets_generated_name() {
        let mut rng = rand::thread_rng();
        let name = guest_display_name(&mut rng);
        assert!(name.starts_with("Guest-"));
        assert_eq!(name.len(), "Guest-0000".len());
    }

    #[test]
    fn test_create_adds_creator() {
        let creator = host();
        let (session, events) = GameSession::create(Uuid::new_v4(), request(2), &creator).unwrap();

        assert_eq!(session.status(), SessionStatus::Waiting);
        assert_eq!(session.state.players.len(), 1);
        assert_eq!(session.state.players[0].user_id, Some(creator.id));
        assert!(matches!(events[0], SessionEvent::PlayerJoined { .. }));
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let result = GameSession::create(Uuid::new_v4(), request(0), &host());
        assert!(matches!(result, Err(GameError::InvalidConfiguration { .. })));

        let mut bad_grid = request(2);
        bad_grid.mode = GameMode::WordSearch {
            category_id: None,
            grid_size: 2,
            word_count: 5,
            filters: PoolFilters::default(),
        };
        let result = GameSession::create(Uuid::new_v4(), bad_grid, &host());
        assert!(matches!(result, Err(GameError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_restart_from_waiting_rejected() {
        let creator = host();
        let (mut session, _) = GameSession::create(Uuid::new_v4(), request(2), &creator).unwrap();

        assert!(matches!(
            session.restart(creator.id),
            Err(GameError::InvalidGameState { .. })
        ));
    }

    #[test]
    fn test_leader_prefers_earliest_on_tie() {
        let creator = host();
        let (mut session, _) = GameSession::create(Uuid::new_v4(), request(3), &creator).unwrap();
        session.join(&Identity::guest(Uuid::new_v4()), 1).unwrap();

        assert_eq!(session.leader(), Some(creator.id));
    }
}
