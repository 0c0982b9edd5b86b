use crate::QuestionPool;
use game_types::{
    Direction, GameError, GridCell, GridPosition, PlacedWord, PlayerId, WordSearchSnapshot,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

pub const PLACEMENT_ATTEMPTS: usize = 100;
const FILL_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Uppercase letters only; spaces, hyphens and digits are stripped
pub fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Pick up to `count` distinct pool nouns short enough for the grid
pub fn word_list(pool: &QuestionPool, count: usize, grid_size: usize, seed: u64) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut words: Vec<String> = Vec::new();

    for noun in &pool.nouns {
        let normalized = normalize_word(&noun.word);
        let length = normalized.chars().count();
        if length >= 2 && length <= grid_size && !words.contains(&normalized) {
            words.push(normalized);
        }
    }

    words.shuffle(&mut rng);
    words.truncate(count);
    words
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoundWord {
    pub word: String,
    pub cells: Vec<GridPosition>,
}

#[derive(Debug, Clone)]
pub struct WordSearchGrid {
    size: usize,
    seed: u64,
    cells: Vec<Vec<GridCell>>,
    placed: Vec<PlacedWord>,
    dropped: Vec<String>,
}

impl WordSearchGrid {
    /// Place each word in one of eight directions, then fill the gaps.
    /// The same words, size and seed always produce the same grid.
    pub fn generate(words: &[String], size: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut letters: Vec<Vec<Option<char>>> = vec![vec![None; size]; size];
        let mut placed = Vec::new();
        let mut dropped = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for raw in words {
            let word = normalize_word(raw);
            if word.is_empty() || seen.contains(&word) {
                continue;
            }
            seen.push(word.clone());

            match Self::place_word(&mut letters, &word, &mut rng) {
                Some((origin, direction)) => placed.push(PlacedWord {
                    word,
                    origin,
                    direction,
                    found_by: None,
                }),
                None => {
                    warn!(
                        "Could not place '{}' in a {}x{} grid after {} attempts",
                        word, size, size, PLACEMENT_ATTEMPTS
                    );
                    dropped.push(word);
                }
            }
        }

        let cells = letters
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|letter| GridCell {
                        letter: letter.unwrap_or_else(|| {
                            FILL_ALPHABET[rng.gen_range(0..FILL_ALPHABET.len())] as char
                        }),
                        is_selected: false,
                        is_found: false,
                    })
                    .collect()
            })
            .collect();

        debug!(
            "Generated {}x{} grid: {} placed, {} dropped",
            size,
            size,
            placed.len(),
            dropped.len()
        );

        Self {
            size,
            seed,
            cells,
            placed,
            dropped,
        }
    }

    fn place_word(
        letters: &mut [Vec<Option<char>>],
        word: &str,
        rng: &mut ChaCha8Rng,
    ) -> Option<(GridPosition, Direction)> {
        let size = letters.len() as i32;
        let chars: Vec<char> = word.chars().collect();
        if size == 0 || chars.len() as i32 > size {
            return None;
        }

        for _ in 0..PLACEMENT_ATTEMPTS {
            let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            let origin = GridPosition::new(rng.gen_range(0..size), rng.gen_range(0..size));

            let path = Self::trace(origin, direction, chars.len());
            let fits = path.iter().zip(&chars).all(|(pos, ch)| {
                Self::in_bounds(*pos, size)
                    && letters[pos.row as usize][pos.col as usize].is_none_or(|existing| existing == *ch)
            });

            if fits {
                for (pos, ch) in path.iter().zip(&chars) {
                    letters[pos.row as usize][pos.col as usize] = Some(*ch);
                }
                return Some((origin, direction));
            }
        }

        None
    }

    fn trace(origin: GridPosition, direction: Direction, length: usize) -> Vec<GridPosition> {
        let (dr, dc) = direction.delta();
        (0..length as i32)
            .map(|i| GridPosition::new(origin.row + dr * i, origin.col + dc * i))
            .collect()
    }

    fn in_bounds(pos: GridPosition, size: i32) -> bool {
        pos.row >= 0 && pos.col >= 0 && pos.row < size && pos.col < size
    }

    /// Cells on the straight line from `start` to `end`, if there is one
    pub fn line(&self, start: GridPosition, end: GridPosition) -> Option<Vec<GridPosition>> {
        let size = self.size as i32;
        if !Self::in_bounds(start, size) || !Self::in_bounds(end, size) {
            return None;
        }

        let dr = end.row - start.row;
        let dc = end.col - start.col;
        if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
            return None;
        }

        let steps = dr.abs().max(dc.abs());
        Some(
            (0..=steps)
                .map(|i| GridPosition::new(start.row + dr.signum() * i, start.col + dc.signum() * i))
                .collect(),
        )
    }

    pub fn letter_at(&self, pos: GridPosition) -> Option<char> {
        if !Self::in_bounds(pos, self.size as i32) {
            return None;
        }
        Some(self.cells[pos.row as usize][pos.col as usize].letter)
    }

    pub fn read_word(&self, cells: &[GridPosition]) -> String {
        cells.iter().filter_map(|pos| self.letter_at(*pos)).collect()
    }

    /// Check a player's selection against the unfound words, read in either
    /// direction. A hit marks the word and its cells as found.
    pub fn select(
        &mut self,
        player_id: PlayerId,
        start: GridPosition,
        end: GridPosition,
    ) -> Result<Option<FoundWord>, GameError> {
        let cells = self.line(start, end).ok_or(GameError::InvalidSelection)?;
        let traced = self.read_word(&cells);
        let reversed: String = traced.chars().rev().collect();

        let Some(placed) = self
            .placed
            .iter_mut()
            .find(|w| w.found_by.is_none() && (w.word == traced || w.word == reversed))
        else {
            return Ok(None);
        };

        placed.found_by = Some(player_id);
        let word = placed.word.clone();

        for pos in &cells {
            self.cells[pos.row as usize][pos.col as usize].is_found = true;
        }

        Ok(Some(FoundWord { word, cells }))
    }

    pub fn is_complete(&self) -> bool {
        self.placed.iter().all(|w| w.found_by.is_some())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn placed_words(&self) -> &[PlacedWord] {
        &self.placed
    }

    pub fn dropped_words(&self) -> &[String] {
        &self.dropped
    }

    pub fn snapshot(&self) -> WordSearchSnapshot {
        WordSearchSnapshot {
            size: self.size as u32,
            seed: self.seed,
            cells: self.cells.clone(),
            placed_words: self.placed.clone(),
            dropped_words: self.dropped.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("Straßen-bahn 2"), "STRASSENBAHN");
        assert_eq!(normalize_word("  "), "");
    }

    #[test]
    fn test_line_requires_straight_path() {
        let grid = WordSearchGrid::generate(&words(&["HUND"]), 6, 1);

        let diagonal = grid
            .line(GridPosition::new(0, 0), GridPosition::new(3, 3))
            .unwrap();
        assert_eq!(diagonal.len(), 4);
        assert_eq!(diagonal[2], GridPosition::new(2, 2));

        assert!(grid.line(GridPosition::new(0, 0), GridPosition::new(1, 3)).is_none());
        assert!(grid.line(GridPosition::new(0, 0), GridPosition::new(0, 6)).is_none());
    }

    #[test]
    fn test_word_longer_than_grid_is_dropped() {
        let grid = WordSearchGrid::generate(&words(&["KATZE", "SCHMETTERLING"]), 6, 3);
        assert_eq!(grid.dropped_words(), &["SCHMETTERLING".to_string()]);
        assert_eq!(grid.placed_words().len(), 1);
    }

    #[test]
    fn test_reverse_selection_finds_word() {
        let mut grid = WordSearchGrid::generate(&words(&["BAUM"]), 6, 11);
        let placed = grid.placed_words()[0].clone();
        let (dr, dc) = placed.direction.delta();
        let end = GridPosition::new(placed.origin.row + dr * 3, placed.origin.col + dc * 3);

        let player = Uuid::new_v4();
        let found = grid.select(player, end, placed.origin).unwrap().unwrap();
        assert_eq!(found.word, "BAUM");
        assert!(grid.is_complete());

        // Already found
        assert_eq!(grid.select(player, placed.origin, end).unwrap(), None);
    }
}
