use crate::{QuestionPool, ScoreUpdate};
use chrono::{DateTime, Utc};
use game_types::{GameError, MemoryCard, MemorySnapshot, PlayerId};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// How long a matched pair stays visible before leaving play
pub const MATCH_REVEAL_DELAY: Duration = Duration::from_millis(500);
/// How long a mismatched pair stays visible before flipping back
pub const MISMATCH_REVEAL_DELAY: Duration = Duration::from_millis(1000);

/// Word and translation pairs drawn from nouns that have a source translation
pub fn translation_pairs(pool: &QuestionPool, count: usize, seed: u64) -> Vec<(String, String)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut pairs: Vec<(String, String)> = pool
        .nouns
        .iter()
        .filter_map(|noun| {
            noun.translation_for(pool.pair.source_language_id)
                .map(|t| (noun.word.clone(), t.trim().to_string()))
        })
        .collect();

    pairs.shuffle(&mut rng);

    // Every face on the board must identify exactly one pair
    let mut faces: HashSet<String> = HashSet::new();
    pairs
        .into_iter()
        .filter(|(word, translation)| {
            let word = word.trim().to_lowercase();
            let translation = translation.to_lowercase();
            if faces.contains(&word) || faces.contains(&translation) || word == translation {
                return false;
            }
            faces.insert(word);
            faces.insert(translation);
            true
        })
        .take(count)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairResolution {
    Matched {
        pair_id: u32,
        card_ids: Vec<u32>,
        score: i32,
        resolve_after: Duration,
        epoch: u64,
        completed: bool,
    },
    Mismatched {
        card_ids: Vec<u32>,
        resolve_after: Duration,
        epoch: u64,
        next_turn: Option<PlayerId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlipResult {
    pub card_id: u32,
    pub face: String,
    /// Cards turned back down because a third card was flipped early
    pub hidden: Vec<u32>,
    pub resolution: Option<PairResolution>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved {
    pub hidden: Vec<u32>,
    pub removed: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
struct Card {
    id: u32,
    pair_id: u32,
    face: String,
    is_face_up: bool,
    is_matched: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryBoard {
    cards: Vec<Card>,
    face_up: Vec<usize>,
    epoch: u64,
    players: Vec<PlayerId>,
    turn: usize,
    scores: HashMap<PlayerId, i32>,
    moves: HashMap<PlayerId, u32>,
    total_moves: u32,
    matched_pairs: u32,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl MemoryBoard {
    /// Two cards per pair (word and translation), shuffled by `seed`
    pub fn new(pairs: &[(String, String)], players: &[PlayerId], seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut faces: Vec<(u32, String)> = pairs
            .iter()
            .enumerate()
            .flat_map(|(i, (word, translation))| {
                [(i as u32, word.clone()), (i as u32, translation.clone())]
            })
            .collect();
        faces.shuffle(&mut rng);

        let cards = faces
            .into_iter()
            .enumerate()
            .map(|(id, (pair_id, face))| Card {
                id: id as u32,
                pair_id,
                face,
                is_face_up: false,
                is_matched: false,
            })
            .collect();

        Self {
            cards,
            face_up: Vec::new(),
            epoch: 0,
            players: players.to_vec(),
            turn: 0,
            scores: players.iter().map(|id| (*id, 0)).collect(),
            moves: players.iter().map(|id| (*id, 0)).collect(),
            total_moves: 0,
            matched_pairs: 0,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn total_pairs(&self) -> u32 {
        (self.cards.len() / 2) as u32
    }

    pub fn current_turn(&self) -> Option<PlayerId> {
        self.players.get(self.turn).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.matched_pairs == self.total_pairs()
    }

    pub fn flip(&mut self, player_id: PlayerId, card_id: u32) -> Result<FlipResult, GameError> {
        if self.is_complete() {
            return Err(GameError::InvalidGameState {
                current_state: "completed".to_string(),
            });
        }

        if !self.scores.contains_key(&player_id) {
            return Err(GameError::PlayerNotFound {
                player_id: player_id.to_string(),
            });
        }

        if self.players.len() > 1 && self.current_turn() != Some(player_id) {
            return Err(GameError::NotYourTurn);
        }

        let index = self
            .cards
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(GameError::InvalidCard { card_id })?;

        let card = &self.cards[index];
        if card.is_matched || card.is_face_up {
            return Err(GameError::InvalidCard { card_id });
        }

        // A pending pair is resolved immediately when a third card comes in
        let hidden = if self.face_up.len() >= 2 {
            self.settle().hidden
        } else {
            Vec::new()
        };

        self.started_at.get_or_insert_with(Utc::now);
        self.cards[index].is_face_up = true;
        self.face_up.push(index);
        let face = self.cards[index].face.clone();

        let resolution = if self.face_up.len() == 2 {
            Some(self.judge_pair(player_id))
        } else {
            None
        };

        Ok(FlipResult {
            card_id,
            face,
            hidden,
            resolution,
        })
    }

    /// Apply the delayed resolution for `epoch`. Stale epochs are ignored.
    pub fn resolve(&mut self, epoch: u64) -> Option<Resolved> {
        if epoch != self.epoch || self.face_up.len() < 2 {
            return None;
        }
        Some(self.settle())
    }

    fn judge_pair(&mut self, player_id: PlayerId) -> PairResolution {
        let (first, second) = (self.face_up[0], self.face_up[1]);
        let card_ids = vec![self.cards[first].id, self.cards[second].id];

        self.epoch += 1;
        self.total_moves += 1;
        *self.moves.entry(player_id).or_insert(0) += 1;

        if self.cards[first].pair_id == self.cards[second].pair_id {
            self.cards[first].is_matched = true;
            self.cards[second].is_matched = true;
            self.matched_pairs += 1;

            let score = self.scores.entry(player_id).or_insert(0);
            *score += 1;
            let score = *score;

            let completed = self.is_complete();
            if completed {
                self.finished_at = Some(Utc::now());
            }

            PairResolution::Matched {
                pair_id: self.cards[first].pair_id,
                card_ids,
                score,
                resolve_after: MATCH_REVEAL_DELAY,
                epoch: self.epoch,
                completed,
            }
        } else {
            if !self.players.is_empty() {
                self.turn = (self.turn + 1) % self.players.len();
            }

            PairResolution::Mismatched {
                card_ids,
                resolve_after: MISMATCH_REVEAL_DELAY,
                epoch: self.epoch,
                next_turn: self.current_turn(),
            }
        }
    }

    fn settle(&mut self) -> Resolved {
        let mut resolved = Resolved::default();

        for index in self.face_up.drain(..) {
            let card = &mut self.cards[index];
            card.is_face_up = false;
            if card.is_matched {
                resolved.removed.push(card.id);
            } else {
                resolved.hidden.push(card.id);
            }
        }

        resolved
    }

    /// Take a departed player out of the turn rotation
    pub fn remove_player(&mut self, player_id: PlayerId) {
        let Some(position) = self.players.iter().position(|id| *id == player_id) else {
            return;
        };

        self.players.remove(position);
        self.scores.remove(&player_id);
        self.moves.remove(&player_id);

        if position < self.turn {
            self.turn -= 1;
        }
        if self.turn >= self.players.len() {
            self.turn = 0;
        }
    }

    /// Milliseconds from the first flip to the last match
    pub fn elapsed_ms(&self) -> Option<u64> {
        let start = self.started_at?;
        let end = self.finished_at.unwrap_or_else(Utc::now);
        Some((end - start).num_milliseconds().max(0) as u64)
    }

    /// Best score, ties broken by fewer moves then rotation order
    pub fn leader(&self) -> Option<PlayerId> {
        self.players
            .iter()
            .map(|id| {
                let score = self.scores.get(id).copied().unwrap_or(0);
                let moves = self.moves.get(id).copied().unwrap_or(0);
                (*id, score, moves)
            })
            .fold(None, |best: Option<(PlayerId, i32, u32)>, candidate| match best {
                Some(b) if (b.1, std::cmp::Reverse(b.2)) >= (candidate.1, std::cmp::Reverse(candidate.2)) => Some(b),
                _ => Some(candidate),
            })
            .map(|(id, _, _)| id)
    }

    pub fn score_updates(&self) -> Vec<ScoreUpdate> {
        let time_ms = if self.is_complete() {
            self.elapsed_ms()
        } else {
            None
        };

        self.players
            .iter()
            .map(|id| ScoreUpdate {
                player_id: *id,
                score: self.scores.get(id).copied().unwrap_or(0),
                progress: self.matched_pairs,
                moves: self.moves.get(id).copied().unwrap_or(0),
                time_ms,
            })
            .collect()
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            cards: self
                .cards
                .iter()
                .map(|card| {
                    // Face-down cards reveal neither face nor partner
                    let visible = card.is_face_up || card.is_matched;
                    MemoryCard {
                        id: card.id,
                        pair_id: visible.then_some(card.pair_id),
                        face: if visible { card.face.clone() } else { String::new() },
                        is_face_up: card.is_face_up,
                        is_matched: card.is_matched,
                    }
                })
                .collect(),
            matched_pairs: self.matched_pairs,
            total_pairs: self.total_pairs(),
            moves: self.total_moves,
            current_turn: self.current_turn(),
        }
    }
}
