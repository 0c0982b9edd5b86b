use game_types::{GameError, PlayerId, Prompt};
use std::collections::{HashMap, HashSet};

/// Score snapshot handed back to the session after each gameplay step
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreUpdate {
    pub player_id: PlayerId,
    pub score: i32,
    pub progress: u32,
    pub moves: u32,
    pub time_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPace {
    /// Everyone answers the same round; it advances once all have answered
    Shared,
    /// Each player walks the prompt list alone; first to `segments` correct wins
    Race { segments: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    Recorded { correct: bool },
    RoundAdvanced { correct: bool, round: u32 },
    Progressed { correct: bool, progress: u32 },
    Finished { correct: bool, winner: Option<PlayerId> },
}

impl AnswerOutcome {
    pub fn is_correct(&self) -> bool {
        match self {
            AnswerOutcome::Recorded { correct }
            | AnswerOutcome::RoundAdvanced { correct, .. }
            | AnswerOutcome::Progressed { correct, .. }
            | AnswerOutcome::Finished { correct, .. } => *correct,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Standing {
    score: i32,
    // Correct answers in a race
    progress: u32,
    // Next prompt index in a race
    position: u32,
    answers: u32,
}

/// Answer bookkeeping for the prompt-driven modes
#[derive(Debug, Clone)]
pub struct QuizRun {
    prompts: Vec<Prompt>,
    pace: QuizPace,
    order: Vec<PlayerId>,
    standings: HashMap<PlayerId, Standing>,
    round: u32,
    answered: HashSet<PlayerId>,
    finished: bool,
    winner: Option<PlayerId>,
}

impl QuizRun {
    pub fn shared(prompts: Vec<Prompt>, players: &[PlayerId]) -> Self {
        Self::new(prompts, players, QuizPace::Shared)
    }

    pub fn race(prompts: Vec<Prompt>, players: &[PlayerId], segments: u32) -> Self {
        // Can't win a race longer than the prompt list
        let segments = segments.min(prompts.len() as u32).max(1);
        Self::new(prompts, players, QuizPace::Race { segments })
    }

    fn new(prompts: Vec<Prompt>, players: &[PlayerId], pace: QuizPace) -> Self {
        let finished = prompts.is_empty();
        Self {
            prompts,
            pace,
            order: players.to_vec(),
            standings: players.iter().map(|id| (*id, Standing::default())).collect(),
            round: 0,
            answered: HashSet::new(),
            finished,
            winner: None,
        }
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn pace(&self) -> QuizPace {
        self.pace
    }

    pub fn current_round(&self) -> u32 {
        self.round
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Index of the prompt a player should be answering next
    pub fn position_of(&self, player_id: PlayerId) -> Option<u32> {
        match self.pace {
            QuizPace::Shared => self.standings.contains_key(&player_id).then_some(self.round),
            QuizPace::Race { .. } => self.standings.get(&player_id).map(|s| s.position),
        }
    }

    pub fn submit(
        &mut self,
        player_id: PlayerId,
        round: u32,
        answer: &str,
    ) -> Result<AnswerOutcome, GameError> {
        if self.finished {
            return Err(GameError::InvalidGameState {
                current_state: "finished".to_string(),
            });
        }

        let expected = self
            .position_of(player_id)
            .ok_or_else(|| GameError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;

        if self.pace == QuizPace::Shared && self.answered.contains(&player_id) {
            return Err(GameError::AlreadyAnswered);
        }

        if round != expected {
            // Late answers for a round already behind the player
            if round < expected {
                return Err(GameError::AlreadyAnswered);
            }
            return Err(GameError::InvalidGameState {
                current_state: format!("round {}", expected),
            });
        }

        let prompt = self
            .prompts
            .get(round as usize)
            .ok_or_else(|| GameError::InvalidGameState {
                current_state: format!("round {}", round),
            })?;
        let correct = prompt.is_correct(answer);

        let standing = self
            .standings
            .get_mut(&player_id)
            .ok_or_else(|| GameError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;
        standing.answers += 1;
        if correct {
            standing.score += 1;
        }

        match self.pace {
            QuizPace::Shared => {
                standing.progress = round + 1;
                self.answered.insert(player_id);
                Ok(self
                    .advance_shared_round(correct)
                    .unwrap_or(AnswerOutcome::Recorded { correct }))
            }
            QuizPace::Race { segments } => {
                standing.position += 1;
                if correct {
                    standing.progress += 1;
                }
                let progress = standing.progress;

                if progress >= segments {
                    self.finish_with(Some(player_id));
                    return Ok(AnswerOutcome::Finished {
                        correct,
                        winner: Some(player_id),
                    });
                }

                if self.everyone_exhausted() {
                    let winner = self.finish();
                    return Ok(AnswerOutcome::Finished { correct, winner });
                }

                Ok(AnswerOutcome::Progressed { correct, progress })
            }
        }
    }

    /// Drop a departed player so a shared round does not wait on them
    pub fn remove_player(&mut self, player_id: PlayerId) -> Option<AnswerOutcome> {
        self.standings.remove(&player_id)?;
        self.order.retain(|id| *id != player_id);
        self.answered.remove(&player_id);

        if self.finished || self.order.is_empty() {
            return None;
        }

        match self.pace {
            QuizPace::Shared => self.advance_shared_round(false),
            QuizPace::Race { .. } if self.everyone_exhausted() => {
                let winner = self.finish();
                Some(AnswerOutcome::Finished {
                    correct: false,
                    winner,
                })
            }
            QuizPace::Race { .. } => None,
        }
    }

    /// Stop the run (timer expiry or host end) and pick the leader
    pub fn finish(&mut self) -> Option<PlayerId> {
        let winner = self.leader();
        self.finish_with(winner);
        winner
    }

    /// Highest score (race: most progress); ties go to the earliest player
    pub fn leader(&self) -> Option<PlayerId> {
        let key = |s: &Standing| match self.pace {
            QuizPace::Shared => (s.score, 0),
            QuizPace::Race { .. } => (s.progress as i32, s.score),
        };

        let mut best: Option<(PlayerId, (i32, i32))> = None;
        for id in &self.order {
            let Some(standing) = self.standings.get(id) else {
                continue;
            };
            let candidate = key(standing);
            if best.is_none_or(|(_, top)| candidate > top) {
                best = Some((*id, candidate));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn score_updates(&self) -> Vec<ScoreUpdate> {
        self.order
            .iter()
            .filter_map(|id| {
                self.standings.get(id).map(|s| ScoreUpdate {
                    player_id: *id,
                    score: s.score,
                    progress: s.progress,
                    moves: s.answers,
                    time_ms: None,
                })
            })
            .collect()
    }

    fn advance_shared_round(&mut self, correct: bool) -> Option<AnswerOutcome> {
        if !self.order.iter().all(|id| self.answered.contains(id)) {
            return None;
        }

        self.answered.clear();
        self.round += 1;

        if self.round as usize >= self.prompts.len() {
            let winner = self.finish();
            return Some(AnswerOutcome::Finished { correct, winner });
        }

        Some(AnswerOutcome::RoundAdvanced {
            correct,
            round: self.round,
        })
    }

    fn everyone_exhausted(&self) -> bool {
        let total = self.prompts.len() as u32;
        self.standings.values().all(|s| s.position >= total)
    }

    fn finish_with(&mut self, winner: Option<PlayerId>) {
        self.finished = true;
        self.winner = winner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn prompt(answer: &str) -> Prompt {
        Prompt::Translation {
            noun_id: 1,
            word: "Hund".to_string(),
            options: vec![answer.to_string(), "cat".to_string(), "mouse".to_string()],
            correct_answer: answer.to_string(),
        }
    }

    fn prompts(n: usize) -> Vec<Prompt> {
        (0..n).map(|i| prompt(&format!("answer{}", i))).collect()
    }

    #[test]
    fn test_shared_round_waits_for_everyone() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut run = QuizRun::shared(prompts(2), &[a, b]);

        assert_eq!(
            run.submit(a, 0, "answer0").unwrap(),
            AnswerOutcome::Recorded { correct: true }
        );
        assert_eq!(run.submit(a, 0, "answer0"), Err(GameError::AlreadyAnswered));

        assert_eq!(
            run.submit(b, 0, "wrong").unwrap(),
            AnswerOutcome::RoundAdvanced {
                correct: false,
                round: 1
            }
        );

        run.submit(a, 1, "wrong").unwrap();
        let outcome = run.submit(b, 1, " answer1 ").unwrap();
        assert_eq!(
            outcome,
            AnswerOutcome::Finished {
                correct: true,
                winner: Some(a)
            }
        );
        assert!(run.is_finished());
    }

    #[test]
    fn test_shared_round_advances_when_straggler_leaves() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut run = QuizRun::shared(prompts(3), &[a, b]);

        run.submit(a, 0, "answer0").unwrap();
        let outcome = run.remove_player(b);
        assert!(matches!(
            outcome,
            Some(AnswerOutcome::RoundAdvanced { round: 1, .. })
        ));
    }

    #[test]
    fn test_race_first_to_segments_wins() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut run = QuizRun::race(prompts(5), &[a, b], 2);

        assert_eq!(
            run.submit(a, 0, "answer0").unwrap(),
            AnswerOutcome::Progressed {
                correct: true,
                progress: 1
            }
        );
        run.submit(b, 0, "answer0").unwrap();
        // Wrong answers move on without progress
        assert_eq!(
            run.submit(b, 1, "nope").unwrap(),
            AnswerOutcome::Progressed {
                correct: false,
                progress: 1
            }
        );

        let outcome = run.submit(a, 1, "answer1").unwrap();
        assert_eq!(
            outcome,
            AnswerOutcome::Finished {
                correct: true,
                winner: Some(a)
            }
        );
        assert!(run.submit(b, 2, "answer2").is_err());
    }

    #[test]
    fn test_timed_race_finish_picks_most_progress() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut run = QuizRun::race(prompts(10), &[a, b], 10);

        run.submit(b, 0, "answer0").unwrap();
        assert_eq!(run.finish(), Some(b));
    }

    #[test]
    fn test_unknown_player_rejected() {
        let mut run = QuizRun::shared(prompts(1), &[Uuid::new_v4()]);
        assert!(matches!(
            run.submit(Uuid::new_v4(), 0, "answer0"),
            Err(GameError::PlayerNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_prompt_list_is_finished() {
        let run = QuizRun::shared(Vec::new(), &[Uuid::new_v4()]);
        assert!(run.is_finished());
    }
}
