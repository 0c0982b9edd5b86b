use crate::QuestionPool;
use game_types::{NounRecord, Prompt, TaskType, TenseRecord, VerbRecord};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::debug;

/// Attempts allowed per requested prompt before giving up
pub const ATTEMPTS_PER_PROMPT: usize = 20;
pub const DISTRACTOR_COUNT: usize = 2;

pub struct PromptSynthesizer<R: Rng> {
    rng: R,
}

impl<R: Rng> PromptSynthesizer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Produce at most `count` prompts, cycling through `task_types` in order.
    /// Each noun and verb is used at most once per call. `tense_filter`
    /// narrows conjugation prompts to the given tense ids.
    pub fn synthesize(
        &mut self,
        pool: &QuestionPool,
        count: usize,
        task_types: &[TaskType],
        tense_filter: Option<&[i32]>,
    ) -> Vec<Prompt> {
        if count == 0 || task_types.is_empty() {
            return Vec::new();
        }

        let tenses: Vec<&TenseRecord> = pool
            .tenses
            .iter()
            .filter(|t| tense_filter.is_none_or(|ids| ids.contains(&t.id)))
            .collect();

        let mut nouns: Vec<&NounRecord> = pool.nouns.iter().collect();
        let mut verbs: Vec<&VerbRecord> = pool.verbs.iter().collect();
        nouns.shuffle(&mut self.rng);
        verbs.shuffle(&mut self.rng);

        let needs_nouns = task_types
            .iter()
            .any(|t| matches!(t, TaskType::ArticleGender | TaskType::Translation));
        let needs_verbs = task_types.contains(&TaskType::VerbConjugation);

        let mut noun_cursor = 0;
        let mut verb_cursor = 0;
        let mut used_combinations: HashSet<(i32, i32)> = HashSet::new();
        let mut prompts = Vec::with_capacity(count);

        let budget = count * ATTEMPTS_PER_PROMPT;
        let mut attempts = 0;
        let mut task_index = 0;

        while prompts.len() < count && attempts < budget {
            let nouns_left = needs_nouns && noun_cursor < nouns.len();
            let verbs_left = needs_verbs && verb_cursor < verbs.len();
            if !nouns_left && !verbs_left {
                break;
            }

            attempts += 1;
            let task = task_types[task_index % task_types.len()];
            task_index += 1;

            let prompt = match task {
                TaskType::ArticleGender => {
                    let Some(noun) = nouns.get(noun_cursor).copied() else {
                        continue;
                    };
                    noun_cursor += 1;
                    self.article_prompt(pool, noun)
                }
                TaskType::Translation => {
                    let Some(noun) = nouns.get(noun_cursor).copied() else {
                        continue;
                    };
                    noun_cursor += 1;
                    self.translation_prompt(pool, noun, &nouns)
                }
                TaskType::VerbConjugation => {
                    let Some(verb) = verbs.get(verb_cursor).copied() else {
                        continue;
                    };
                    verb_cursor += 1;
                    self.conjugation_prompt(pool, &tenses, verb, &verbs, &mut used_combinations)
                }
            };

            if let Some(prompt) = prompt {
                prompts.push(prompt);
            }
        }

        if prompts.len() < count {
            debug!(
                "Synthesized {} of {} requested prompts after {} attempts",
                prompts.len(),
                count,
                attempts
            );
        }

        prompts
    }

    /// One random conjugation question for solo verb practice
    pub fn practice_prompt(&mut self, pool: &QuestionPool) -> Option<Prompt> {
        self.synthesize(pool, 1, &[TaskType::VerbConjugation], None)
            .into_iter()
            .next()
    }

    fn article_prompt(&mut self, pool: &QuestionPool, noun: &NounRecord) -> Option<Prompt> {
        let gender = noun.gender.as_deref()?.trim();
        if !pool.pair.gender_options.iter().any(|g| g.trim() == gender) {
            return None;
        }

        let translation = noun.translation_for(pool.pair.source_language_id)?;

        let candidates: Vec<String> = pool
            .pair
            .gender_options
            .iter()
            .map(|g| g.trim().to_string())
            .collect();
        let mut distractors = Vec::new();
        self.take_distractors(&mut distractors, candidates, gender);
        if distractors.len() < DISTRACTOR_COUNT {
            return None;
        }

        Some(Prompt::ArticleGender {
            noun_id: noun.id,
            word: noun.word.clone(),
            translation: translation.to_string(),
            options: self.build_options(gender, distractors),
            correct_answer: gender.to_string(),
        })
    }

    fn translation_prompt(
        &mut self,
        pool: &QuestionPool,
        noun: &NounRecord,
        draw: &[&NounRecord],
    ) -> Option<Prompt> {
        let source_language = pool.pair.source_language_id;
        let correct = noun.translation_for(source_language)?.trim().to_string();

        let candidates: Vec<String> = draw
            .iter()
            .filter(|other| other.id != noun.id)
            .filter_map(|other| other.translation_for(source_language))
            .map(|t| t.trim().to_string())
            .collect();

        let mut distractors = Vec::new();
        self.take_distractors(&mut distractors, candidates, &correct);
        if distractors.len() < DISTRACTOR_COUNT {
            return None;
        }

        Some(Prompt::Translation {
            noun_id: noun.id,
            word: noun.word.clone(),
            options: self.build_options(&correct, distractors),
            correct_answer: correct,
        })
    }

    fn conjugation_prompt(
        &mut self,
        pool: &QuestionPool,
        tenses: &[&TenseRecord],
        verb: &VerbRecord,
        draw: &[&VerbRecord],
        used_combinations: &mut HashSet<(i32, i32)>,
    ) -> Option<Prompt> {
        let available: Vec<(i32, i32)> = tenses
            .iter()
            .flat_map(|t| pool.pronouns.iter().map(move |p| (t.id, p.id)))
            .filter(|&(tense_id, pronoun_id)| {
                pool.conjugation(verb.id, tense_id, pronoun_id).is_some()
            })
            .collect();
        if available.is_empty() {
            return None;
        }

        let mut fresh: Vec<(i32, i32)> = available
            .iter()
            .filter(|combo| !used_combinations.contains(*combo))
            .copied()
            .collect();
        if fresh.is_empty() {
            // Every combination has been asked; start the rotation over
            used_combinations.clear();
            fresh = available;
        }

        let (tense_id, pronoun_id) = *fresh.choose(&mut self.rng)?;
        let correct = pool.conjugation(verb.id, tense_id, pronoun_id)?.to_string();
        let mut distractors = Vec::new();

        // Same verb and tense, other pronouns
        let same_tense: Vec<String> = pool
            .pronouns
            .iter()
            .filter(|p| p.id != pronoun_id)
            .filter_map(|p| pool.conjugation(verb.id, tense_id, p.id))
            .map(str::to_string)
            .collect();
        self.take_distractors(&mut distractors, same_tense, &correct);

        // Same verb, other permitted tenses
        if distractors.len() < DISTRACTOR_COUNT {
            let other_tenses: Vec<String> = tenses
                .iter()
                .filter(|t| t.id != tense_id)
                .flat_map(|t| pool.pronouns.iter().map(move |p| (t.id, p.id)))
                .filter_map(|(t, p)| pool.conjugation(verb.id, t, p))
                .map(str::to_string)
                .collect();
            self.take_distractors(&mut distractors, other_tenses, &correct);
        }

        // Other verbs, same tense and pronoun
        if distractors.len() < DISTRACTOR_COUNT {
            let other_verbs: Vec<String> = draw
                .iter()
                .filter(|other| other.id != verb.id)
                .filter_map(|other| pool.conjugation(other.id, tense_id, pronoun_id))
                .map(str::to_string)
                .collect();
            self.take_distractors(&mut distractors, other_verbs, &correct);
        }

        if distractors.len() < DISTRACTOR_COUNT {
            return None;
        }

        used_combinations.insert((tense_id, pronoun_id));

        let tense_name = pool
            .tense(tense_id)
            .map(|t| t.name.clone())
            .unwrap_or_default();
        let pronoun_label = pool
            .pronoun(pronoun_id)
            .map(|p| p.label())
            .unwrap_or_default();

        Some(Prompt::VerbConjugation {
            verb_id: verb.id,
            infinitive: verb.infinitive.clone(),
            translation: verb.translation.clone(),
            tense_id,
            tense_name,
            pronoun_id,
            pronoun_label,
            options: self.build_options(&correct, distractors),
            correct_answer: correct,
        })
    }

    /// Add random distinct candidates until `found` holds enough distractors
    fn take_distractors(&mut self, found: &mut Vec<String>, candidates: Vec<String>, correct: &str) {
        let mut unique: Vec<String> = Vec::new();
        for candidate in candidates {
            if candidate.is_empty()
                || candidate == correct
                || found.contains(&candidate)
                || unique.contains(&candidate)
            {
                continue;
            }
            unique.push(candidate);
        }

        unique.shuffle(&mut self.rng);
        for candidate in unique {
            if found.len() >= DISTRACTOR_COUNT {
                break;
            }
            found.push(candidate);
        }
    }

    fn build_options(&mut self, correct: &str, distractors: Vec<String>) -> Vec<String> {
        let mut options = distractors;
        options.truncate(DISTRACTOR_COUNT);
        options.push(correct.to_string());
        options.shuffle(&mut self.rng);
        options
    }
}
