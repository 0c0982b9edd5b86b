use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::websocket::ConnectionManager;
use game_core::{
    AnswerOutcome, FlipResult, GameSession, MemoryBoard, PairResolution, PromptSynthesizer,
    QuestionPoolBuilder, QuizRun, ScoreUpdate, SessionActivity, SessionCleanup, WordSearchGrid,
    translation_pairs, word_list,
};
use game_persistence::{SessionRepository, VocabularySource};
use game_types::{
    CreateSession, Difficulty, GameError, GameMode, GridPosition, Identity, PlaySnapshot,
    PlayerId, PoolFilters, Prompt, RaceMode, SessionEvent, SessionId, SessionState,
    SessionStatus, TaskType, WordSearchSnapshot,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, thiserror::Error)]
pub enum SessionManagerError {
    /// Rejected by the game rules. Reported to the caller only.
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type ManagerResult<T> = Result<T, SessionManagerError>;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub max_players: u32,
    pub prompts_per_game: usize,
    pub retention: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_players: 8,
            prompts_per_game: 10,
            retention: Duration::from_secs(30 * 60),
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_players: config.max_players_per_session,
            prompts_per_game: config.prompts_per_game,
            retention: Duration::from_secs(config.session_retention_minutes * 60),
        }
    }
}

/// Gameplay state of a running session
#[derive(Debug, Clone)]
pub enum Play {
    Quiz(QuizRun),
    WordSearch(WordSearchGrid),
    Memory(MemoryBoard),
}

impl Play {
    pub fn snapshot(&self) -> PlaySnapshot {
        match self {
            Play::Quiz(run) => PlaySnapshot::Quiz {
                prompts: run.prompts().to_vec(),
                current_round: run.current_round(),
            },
            Play::WordSearch(grid) => PlaySnapshot::WordSearch {
                grid: grid.snapshot(),
            },
            Play::Memory(board) => PlaySnapshot::Memory {
                board: board.snapshot(),
            },
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Play::Quiz(run) => run.is_finished(),
            Play::WordSearch(grid) => grid.is_complete(),
            Play::Memory(board) => board.is_complete(),
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveSession {
    session: GameSession,
    play: Option<Play>,
    last_activity: Instant,
}

/// Owns every loaded session. Each session sits behind its own mutex, so
/// check, mutate, persist and broadcast happen as one step per session.
pub struct SessionManager {
    sessions: DashMap<SessionId, Arc<Mutex<ActiveSession>>>,
    vocabulary: Arc<dyn VocabularySource>,
    repository: Option<SessionRepository>,
    connections: Arc<ConnectionManager>,
    settings: SessionSettings,
    cleanup: SessionCleanup,
}

impl SessionManager {
    pub fn new(
        connections: Arc<ConnectionManager>,
        vocabulary: Arc<dyn VocabularySource>,
        settings: SessionSettings,
    ) -> Self {
        let cleanup = SessionCleanup::new(settings.retention);
        Self {
            sessions: DashMap::new(),
            vocabulary,
            repository: None,
            connections,
            settings,
            cleanup,
        }
    }

    pub fn with_repository(mut self, repository: SessionRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub async fn create(
        &self,
        creator: &Identity,
        request: CreateSession,
    ) -> ManagerResult<SessionState> {
        if request.max_players > self.settings.max_players {
            return Err(GameError::InvalidConfiguration {
                reason: format!(
                    "max_players cannot exceed {}",
                    self.settings.max_players
                ),
            }
            .into());
        }

        let language_pair_id = request.language_pair_id;
        if self
            .vocabulary
            .load_language_data(language_pair_id)
            .await?
            .is_none()
        {
            return Err(GameError::LanguagePairNotFound { language_pair_id }.into());
        }

        let (session, events) = GameSession::create(Uuid::new_v4(), request, creator)?;
        self.persist(&session.state).await?;

        let session_id = session.id();
        let state = session.state.clone();
        self.sessions.insert(
            session_id,
            Arc::new(Mutex::new(ActiveSession {
                session,
                play: None,
                last_activity: Instant::now(),
            })),
        );
        self.connections
            .broadcast_to_session(session_id, &events)
            .await;

        Ok(state)
    }

    pub async fn join(
        self: &Arc<Self>,
        session_id: SessionId,
        identity: &Identity,
        language_pair_id: i32,
    ) -> ManagerResult<SessionState> {
        let ((), state) = self
            .mutate(session_id, |next| {
                Ok(((), next.session.join(identity, language_pair_id)?))
            })
            .await?;
        Ok(state)
    }

    pub async fn ready(
        self: &Arc<Self>,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> ManagerResult<SessionState> {
        let ((), state) = self
            .mutate(session_id, |next| Ok(((), next.session.ready(player_id)?)))
            .await?;
        Ok(state)
    }

    pub async fn leave(
        self: &Arc<Self>,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> ManagerResult<SessionState> {
        let ((), state) = self
            .mutate(session_id, |next| {
                let mut events = next.session.leave(player_id)?;
                if next.session.status() == SessionStatus::InProgress {
                    events.extend(Self::drop_from_play(next, player_id)?);
                }
                Ok(((), events))
            })
            .await?;
        Ok(state)
    }

    pub async fn end(
        self: &Arc<Self>,
        session_id: SessionId,
        caller: PlayerId,
    ) -> ManagerResult<SessionState> {
        let ((), state) = self
            .mutate(session_id, |next| Ok(((), next.session.end(caller)?)))
            .await?;
        Ok(state)
    }

    pub async fn restart(
        self: &Arc<Self>,
        session_id: SessionId,
        caller: PlayerId,
    ) -> ManagerResult<SessionState> {
        let ((), state) = self
            .mutate(session_id, |next| {
                let events = next.session.restart(caller)?;
                next.play = None;
                Ok(((), events))
            })
            .await?;
        Ok(state)
    }

    /// Answer a prompt. Returns whether the answer was correct.
    pub async fn submit_answer(
        self: &Arc<Self>,
        session_id: SessionId,
        player_id: PlayerId,
        round: u32,
        answer: &str,
    ) -> ManagerResult<bool> {
        let (correct, _) = self
            .mutate(session_id, |next| {
                Self::ensure_playing(&next.session, player_id)?;
                let Some(Play::Quiz(run)) = &mut next.play else {
                    return Err(Self::wrong_mode(&next.session));
                };

                let outcome = run.submit(player_id, round, answer)?;
                let correct = outcome.is_correct();
                let position = run.position_of(player_id).unwrap_or(0);
                next.session.apply_scores(&run.score_updates())?;

                let events = match outcome {
                    AnswerOutcome::Recorded { .. } => Vec::new(),
                    AnswerOutcome::RoundAdvanced { round, .. } => vec![SessionEvent::NextRound {
                        round,
                        player_id: None,
                        scores: next.session.scores(),
                    }],
                    AnswerOutcome::Progressed { .. } => vec![SessionEvent::NextRound {
                        round: position,
                        player_id: Some(player_id),
                        scores: next.session.scores(),
                    }],
                    AnswerOutcome::Finished { winner, .. } => next.session.complete(winner)?,
                };

                Ok((correct, events))
            })
            .await?;
        Ok(correct)
    }

    /// Trace a word-search selection. Returns the word when it hit one.
    pub async fn select_cells(
        self: &Arc<Self>,
        session_id: SessionId,
        player_id: PlayerId,
        start: GridPosition,
        end: GridPosition,
    ) -> ManagerResult<Option<String>> {
        let (found, _) = self
            .mutate(session_id, |next| {
                Self::ensure_playing(&next.session, player_id)?;
                let Some(Play::WordSearch(grid)) = &mut next.play else {
                    return Err(Self::wrong_mode(&next.session));
                };

                let found = grid.select(player_id, start, end)?;
                let updates = Self::word_search_scores(grid, &next.session.state, player_id);
                next.session.apply_scores(&updates)?;

                let Some(found) = found else {
                    return Ok((None, Vec::new()));
                };

                let score = updates
                    .iter()
                    .find(|u| u.player_id == player_id)
                    .map(|u| u.score)
                    .unwrap_or(0);
                let mut events = vec![SessionEvent::WordFound {
                    player_id,
                    word: found.word.clone(),
                    cells: found.cells,
                    score,
                }];

                if grid.is_complete() {
                    let winner = next.session.leader();
                    events.extend(next.session.complete(winner)?);
                }

                Ok((Some(found.word), events))
            })
            .await?;
        Ok(found)
    }

    /// Flip a memory card. A completed pair is settled after a short reveal.
    pub async fn flip_card(
        self: &Arc<Self>,
        session_id: SessionId,
        player_id: PlayerId,
        card_id: u32,
    ) -> ManagerResult<FlipResult> {
        let (result, state) = self
            .mutate(session_id, |next| {
                Self::ensure_playing(&next.session, player_id)?;
                let Some(Play::Memory(board)) = &mut next.play else {
                    return Err(Self::wrong_mode(&next.session));
                };

                let result = board.flip(player_id, card_id)?;
                let mut events = Vec::new();

                if !result.hidden.is_empty() {
                    events.push(SessionEvent::CardsHidden {
                        card_ids: result.hidden.clone(),
                        next_turn: board.current_turn(),
                    });
                }
                events.push(SessionEvent::CardFlipped {
                    player_id,
                    card_id,
                    face: result.face.clone(),
                });

                next.session.apply_scores(&board.score_updates())?;

                if let Some(PairResolution::Matched {
                    pair_id,
                    card_ids,
                    score,
                    completed,
                    ..
                }) = &result.resolution
                {
                    events.push(SessionEvent::PairMatched {
                        player_id,
                        pair_id: *pair_id,
                        card_ids: card_ids.clone(),
                        score: *score,
                    });
                    if *completed {
                        let winner = board.leader();
                        events.extend(next.session.complete(winner)?);
                    }
                }

                Ok((result, events))
            })
            .await?;

        if let Some(resolution) = &result.resolution {
            let (epoch, delay) = match resolution {
                PairResolution::Matched {
                    epoch,
                    resolve_after,
                    ..
                }
                | PairResolution::Mismatched {
                    epoch,
                    resolve_after,
                    ..
                } => (*epoch, *resolve_after),
            };
            self.schedule_card_resolve(session_id, state.generation, epoch, delay);
        }

        Ok(result)
    }

    /// Settle a revealed pair. Returns false when the pair was already
    /// settled by a later flip or the session moved on.
    pub async fn resolve_cards(&self, session_id: SessionId, generation: u32, epoch: u64) -> bool {
        let Ok(entry) = self.entry(session_id).await else {
            return false;
        };
        let mut active = entry.lock().await;
        if active.session.state.generation != generation {
            return false;
        }

        let Some(Play::Memory(board)) = &mut active.play else {
            return false;
        };
        let Some(resolved) = board.resolve(epoch) else {
            return false;
        };
        let next_turn = board.current_turn();

        debug!(
            "Session {}: settled pair (hidden {:?}, removed {:?})",
            session_id, resolved.hidden, resolved.removed
        );

        if !resolved.hidden.is_empty() {
            let events = vec![SessionEvent::CardsHidden {
                card_ids: resolved.hidden,
                next_turn,
            }];
            self.connections
                .broadcast_to_session(session_id, &events)
                .await;
        }
        active.last_activity = Instant::now();
        true
    }

    /// Close a timed race. Returns false if it already ended some other way.
    pub async fn finish_race(
        self: &Arc<Self>,
        session_id: SessionId,
        generation: u32,
    ) -> ManagerResult<bool> {
        let (finished, _) = self
            .mutate(session_id, |next| {
                if next.session.status() != SessionStatus::InProgress
                    || next.session.state.generation != generation
                {
                    return Ok((false, Vec::new()));
                }
                let Some(Play::Quiz(run)) = &mut next.play else {
                    return Ok((false, Vec::new()));
                };

                let winner = run.finish();
                next.session.apply_scores(&run.score_updates())?;
                Ok((true, next.session.complete(winner)?))
            })
            .await?;
        Ok(finished)
    }

    pub async fn snapshot(
        &self,
        session_id: SessionId,
    ) -> ManagerResult<(SessionState, Option<PlaySnapshot>)> {
        let entry = self.entry(session_id).await?;
        let active = entry.lock().await;
        Ok((
            active.session.state.clone(),
            active.play.as_ref().map(Play::snapshot),
        ))
    }

    /// Prompts of the current run, for members of the session
    pub async fn prompts(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> ManagerResult<Vec<Prompt>> {
        let entry = self.entry(session_id).await?;
        let active = entry.lock().await;
        Self::ensure_member(&active.session, player_id)?;

        match &active.play {
            Some(Play::Quiz(run)) => Ok(run.prompts().to_vec()),
            _ => Err(Self::wrong_mode(&active.session).into()),
        }
    }

    /// Current word-search grid, for members of the session
    pub async fn word_grid(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> ManagerResult<WordSearchSnapshot> {
        let entry = self.entry(session_id).await?;
        let active = entry.lock().await;
        Self::ensure_member(&active.session, player_id)?;

        match &active.play {
            Some(Play::WordSearch(grid)) => Ok(grid.snapshot()),
            _ => Err(Self::wrong_mode(&active.session).into()),
        }
    }

    /// Waiting sessions for a language pair, newest first
    pub async fn open_sessions(&self, language_pair_id: i32) -> ManagerResult<Vec<SessionState>> {
        if let Some(repository) = &self.repository {
            return Ok(repository.find_open(language_pair_id).await?);
        }

        let entries: Vec<Arc<Mutex<ActiveSession>>> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut open = Vec::new();
        for entry in entries {
            let active = entry.lock().await;
            let state = &active.session.state;
            if state.status == SessionStatus::Waiting && state.language_pair_id == language_pair_id
            {
                open.push(state.clone());
            }
        }
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(open)
    }

    /// One conjugation prompt outside of any session
    pub async fn practice_prompt(
        &self,
        language_pair_id: i32,
        difficulty: Difficulty,
        tense_ids: &[i32],
    ) -> ManagerResult<Option<Prompt>> {
        let data = self
            .vocabulary
            .load_language_data(language_pair_id)
            .await?
            .ok_or(GameError::LanguagePairNotFound { language_pair_id })?;

        let pool = QuestionPoolBuilder::build(&data, &PoolFilters::default(), difficulty);
        let mut synthesizer = PromptSynthesizer::new(ChaCha8Rng::from_entropy());

        let prompt = if tense_ids.is_empty() {
            synthesizer.practice_prompt(&pool)
        } else {
            synthesizer
                .synthesize(&pool, 1, &[TaskType::VerbConjugation], Some(tense_ids))
                .pop()
        };
        Ok(prompt)
    }

    /// Drop finished sessions that have been idle past retention.
    /// Sessions busy with an operation are skipped until the next pass.
    pub fn cleanup_finished_sessions(&self) -> usize {
        let now = Instant::now();
        let activity: Vec<SessionActivity> = self
            .sessions
            .iter()
            .filter_map(|entry| {
                let active = entry.value().try_lock().ok()?;
                Some(SessionActivity {
                    session_id: *entry.key(),
                    status: active.session.status(),
                    last_activity: active.last_activity,
                })
            })
            .collect();

        let evictable = self.cleanup.evictable(activity, now);
        for session_id in &evictable {
            self.sessions.remove(session_id);
            debug!("Evicted finished session {}", session_id);
        }
        evictable.len()
    }

    /// Loaded session, reading it back from storage on a cache miss
    async fn entry(&self, session_id: SessionId) -> ManagerResult<Arc<Mutex<ActiveSession>>> {
        if let Some(entry) = self.sessions.get(&session_id) {
            return Ok(Arc::clone(entry.value()));
        }

        let not_found = || GameError::SessionNotFound {
            session_id: session_id.to_string(),
        };
        let repository = self.repository.as_ref().ok_or_else(not_found)?;
        let state = repository.find(session_id).await?.ok_or_else(not_found)?;

        let play = if state.status == SessionStatus::InProgress {
            warn!(
                "Session {} reloaded mid-game, its run restarts from the stored seed",
                session_id
            );
            Some(self.build_play(&state).await?)
        } else {
            None
        };
        debug!("Reloaded session {} from storage", session_id);

        let loaded = ActiveSession {
            session: GameSession::from_state(state),
            play,
            last_activity: Instant::now(),
        };
        // A concurrent reload may have won the race; keep whichever landed first
        let entry = self
            .sessions
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(loaded)));
        Ok(Arc::clone(entry.value()))
    }

    /// Run `op` against a copy of the session and commit the copy only if
    /// the rules accept it and it was stored.
    async fn mutate<T, F>(
        self: &Arc<Self>,
        session_id: SessionId,
        op: F,
    ) -> ManagerResult<(T, SessionState)>
    where
        F: FnOnce(&mut ActiveSession) -> Result<(T, Vec<SessionEvent>), GameError>,
    {
        let entry = self.entry(session_id).await?;
        let mut active = entry.lock().await;

        let mut next = active.clone();
        let (value, events) = op(&mut next)?;
        self.commit(&mut active, next, events).await?;

        Ok((value, active.session.state.clone()))
    }

    async fn commit(
        self: &Arc<Self>,
        active: &mut ActiveSession,
        mut next: ActiveSession,
        mut events: Vec<SessionEvent>,
    ) -> ManagerResult<()> {
        let session_id = next.session.id();
        let started = events
            .iter()
            .any(|e| matches!(e, SessionEvent::GameStarted { .. }));

        if started {
            let play = self.build_play(&next.session.state).await?;
            if play.is_finished() {
                warn!(
                    "Session {} has no playable content for its filters",
                    session_id
                );
                events.extend(next.session.complete(None)?);
            }
            next.play = Some(play);
        }

        let destroyed = next.session.is_destroyed();
        if destroyed {
            if let Some(repository) = &self.repository {
                repository.delete(session_id).await?;
            }
        } else {
            self.persist(&next.session.state).await?;
        }

        next.last_activity = Instant::now();
        let deadline = Self::race_deadline(&next.session.state);
        let generation = next.session.state.generation;
        *active = next;

        self.connections
            .broadcast_to_session(session_id, &events)
            .await;

        if destroyed {
            info!("Session {} destroyed after its last player left", session_id);
            self.sessions.remove(&session_id);
        }
        if let (true, Some(after)) = (started, deadline) {
            self.schedule_race_deadline(session_id, generation, after);
        }

        Ok(())
    }

    async fn build_play(&self, state: &SessionState) -> ManagerResult<Play> {
        let language_pair_id = state.language_pair_id;
        let data = self
            .vocabulary
            .load_language_data(language_pair_id)
            .await?
            .ok_or(GameError::LanguagePairNotFound { language_pair_id })?;

        let pool = QuestionPoolBuilder::build(&data, &state.mode.pool_filters(), state.difficulty);
        let players: Vec<PlayerId> = state.players.iter().map(|p| p.id).collect();
        let seed = state.seed;

        let play = match &state.mode {
            GameMode::GenderDuel { .. } | GameMode::VerbSlot { .. } => {
                let prompts = PromptSynthesizer::new(ChaCha8Rng::seed_from_u64(seed)).synthesize(
                    &pool,
                    self.settings.prompts_per_game,
                    &state.mode.task_types(),
                    None,
                );
                Play::Quiz(QuizRun::shared(prompts, &players))
            }
            GameMode::Derby { segments, .. } => {
                let count = self.settings.prompts_per_game.max(*segments as usize);
                let prompts = PromptSynthesizer::new(ChaCha8Rng::seed_from_u64(seed)).synthesize(
                    &pool,
                    count,
                    &state.mode.task_types(),
                    None,
                );
                Play::Quiz(QuizRun::race(prompts, &players, *segments))
            }
            GameMode::WordSearch {
                grid_size,
                word_count,
                ..
            } => {
                let size = *grid_size as usize;
                let words = word_list(&pool, *word_count as usize, size, seed);
                Play::WordSearch(WordSearchGrid::generate(&words, size, seed))
            }
            GameMode::MemoryTranslation { pair_count, .. } => {
                let pairs = translation_pairs(&pool, *pair_count as usize, seed);
                Play::Memory(MemoryBoard::new(&pairs, &players, seed))
            }
        };

        info!(
            "Session {} started {} (seed {}, generation {})",
            state.id,
            state.mode.name(),
            seed,
            state.generation
        );
        Ok(play)
    }

    async fn persist(&self, state: &SessionState) -> anyhow::Result<()> {
        if let Some(repository) = &self.repository {
            repository.save(state).await?;
        }
        Ok(())
    }

    fn schedule_card_resolve(
        self: &Arc<Self>,
        session_id: SessionId,
        generation: u32,
        epoch: u64,
        delay: Duration,
    ) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            manager.resolve_cards(session_id, generation, epoch).await;
        });
    }

    fn schedule_race_deadline(self: &Arc<Self>, session_id: SessionId, generation: u32, after: Duration) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            match manager.finish_race(session_id, generation).await {
                Ok(true) => info!("Timed race in session {} finished", session_id),
                Ok(false) => {}
                // The session may have been evicted or destroyed meanwhile
                Err(e) => debug!("Race deadline for session {} skipped: {}", session_id, e),
            }
        });
    }

    fn race_deadline(state: &SessionState) -> Option<Duration> {
        match &state.mode {
            GameMode::Derby {
                race_mode: RaceMode::Timed,
                duration_seconds,
                ..
            } if state.status == SessionStatus::InProgress => {
                Some(Duration::from_secs(*duration_seconds as u64))
            }
            _ => None,
        }
    }

    /// Keep a running play consistent after a player left mid-game
    fn drop_from_play(
        next: &mut ActiveSession,
        player_id: PlayerId,
    ) -> Result<Vec<SessionEvent>, GameError> {
        match &mut next.play {
            Some(Play::Quiz(run)) => match run.remove_player(player_id) {
                Some(AnswerOutcome::RoundAdvanced { round, .. }) => {
                    Ok(vec![SessionEvent::NextRound {
                        round,
                        player_id: None,
                        scores: next.session.scores(),
                    }])
                }
                Some(AnswerOutcome::Finished { winner, .. }) => {
                    next.session.apply_scores(&run.score_updates())?;
                    next.session.complete(winner)
                }
                _ => Ok(Vec::new()),
            },
            Some(Play::Memory(board)) => {
                board.remove_player(player_id);
                Ok(Vec::new())
            }
            _ => Ok(Vec::new()),
        }
    }

    fn word_search_scores(
        grid: &WordSearchGrid,
        state: &SessionState,
        selector: PlayerId,
    ) -> Vec<ScoreUpdate> {
        state
            .players
            .iter()
            .map(|player| {
                let found = grid
                    .placed_words()
                    .iter()
                    .filter(|w| w.found_by == Some(player.id))
                    .count() as u32;
                ScoreUpdate {
                    player_id: player.id,
                    score: found as i32,
                    progress: found,
                    moves: player.moves + u32::from(player.id == selector),
                    time_ms: None,
                }
            })
            .collect()
    }

    fn ensure_member(session: &GameSession, player_id: PlayerId) -> Result<(), GameError> {
        if session.state.is_member(player_id) {
            Ok(())
        } else {
            Err(GameError::PlayerNotFound {
                player_id: player_id.to_string(),
            })
        }
    }

    fn ensure_playing(session: &GameSession, player_id: PlayerId) -> Result<(), GameError> {
        match session.status() {
            SessionStatus::InProgress => Self::ensure_member(session, player_id),
            SessionStatus::Ended => Err(GameError::SessionEnded),
            other => Err(GameError::InvalidGameState {
                current_state: other.as_str().to_string(),
            }),
        }
    }

    fn wrong_mode(session: &GameSession) -> GameError {
        GameError::InvalidGameState {
            current_state: format!(
                "{} session {}",
                session.state.mode.name(),
                session.status().as_str()
            ),
        }
    }
}
