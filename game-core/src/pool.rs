use game_types::{
    ConjugationRecord, Difficulty, LanguageData, LanguagePair, NounRecord, PoolFilters,
    PronounRecord, TenseRecord, VerbRecord,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

pub const EASY_VERB_LIMIT: usize = 50;
pub const MEDIUM_VERB_LIMIT: usize = 200;

/// Candidate records for one prompt synthesis run
#[derive(Debug, Clone)]
pub struct QuestionPool {
    pub pair: LanguagePair,
    pub nouns: Vec<NounRecord>,
    pub verbs: Vec<VerbRecord>,
    pub tenses: Vec<TenseRecord>,
    pub pronouns: Vec<PronounRecord>,
    conjugations: HashMap<(i32, i32, i32), String>,
}

impl QuestionPool {
    pub fn is_empty(&self) -> bool {
        self.nouns.is_empty() && self.verbs.is_empty()
    }

    pub fn conjugation(&self, verb_id: i32, tense_id: i32, pronoun_id: i32) -> Option<&str> {
        self.conjugations
            .get(&(verb_id, tense_id, pronoun_id))
            .map(String::as_str)
    }

    pub fn conjugation_count(&self) -> usize {
        self.conjugations.len()
    }

    pub fn tense(&self, tense_id: i32) -> Option<&TenseRecord> {
        self.tenses.iter().find(|t| t.id == tense_id)
    }

    pub fn pronoun(&self, pronoun_id: i32) -> Option<&PronounRecord> {
        self.pronouns.iter().find(|p| p.id == pronoun_id)
    }
}

pub struct QuestionPoolBuilder;

impl QuestionPoolBuilder {
    /// Filter the language data down to the records eligible for prompts.
    /// No matching records yields empty pools, never an error.
    pub fn build(data: &LanguageData, filters: &PoolFilters, difficulty: Difficulty) -> QuestionPool {
        let target_language = data.pair.target_language_id;

        let nouns: Vec<NounRecord> = data
            .nouns
            .iter()
            .filter(|noun| noun.language_id == target_language)
            .filter(|noun| noun.gender.as_deref().is_some_and(|g| !g.trim().is_empty()))
            .filter(|noun| Self::noun_matches(noun, filters))
            .cloned()
            .collect();

        let language_verbs: Vec<VerbRecord> = data
            .verbs
            .iter()
            .filter(|verb| verb.language_id == target_language)
            .cloned()
            .collect();

        let verbs = if filters.verb_list_ids.is_empty() {
            verb_tier(&language_verbs, difficulty)
        } else {
            // An explicit list replaces frequency tiering
            language_verbs
                .into_iter()
                .filter(|verb| verb.list_ids.iter().any(|id| filters.verb_list_ids.contains(id)))
                .collect()
        };

        let language_tenses: Vec<TenseRecord> = data
            .tenses
            .iter()
            .filter(|tense| tense.language_id == target_language)
            .cloned()
            .collect();
        let tenses = tense_tier(&language_tenses, difficulty);

        let mut pronouns: Vec<PronounRecord> = data
            .pronouns
            .iter()
            .filter(|pronoun| pronoun.language_id == target_language)
            .cloned()
            .collect();
        pronouns.sort_by_key(|p| (p.order_index, p.id));

        let verb_ids: HashSet<i32> = verbs.iter().map(|v| v.id).collect();
        let tense_ids: HashSet<i32> = tenses.iter().map(|t| t.id).collect();
        let pronoun_ids: HashSet<i32> = pronouns.iter().map(|p| p.id).collect();

        let conjugations = data
            .conjugations
            .iter()
            .filter(|c| {
                verb_ids.contains(&c.verb_id)
                    && tense_ids.contains(&c.tense_id)
                    && pronoun_ids.contains(&c.pronoun_id)
                    && !c.form.trim().is_empty()
            })
            .map(|c: &ConjugationRecord| ((c.verb_id, c.tense_id, c.pronoun_id), c.form.clone()))
            .collect::<HashMap<_, _>>();

        debug!(
            "Built pool for pair {}: {} nouns, {} verbs, {} tenses, {} conjugations",
            data.pair.id,
            nouns.len(),
            verbs.len(),
            tenses.len(),
            conjugations.len()
        );

        QuestionPool {
            pair: data.pair.clone(),
            nouns,
            verbs,
            tenses,
            pronouns,
            conjugations,
        }
    }

    fn noun_matches(noun: &NounRecord, filters: &PoolFilters) -> bool {
        if let Some(category_id) = filters.category_id {
            if noun.category_id != Some(category_id) {
                return false;
            }
        }

        if !filters.noun_list_ids.is_empty()
            && !noun.list_ids.iter().any(|id| filters.noun_list_ids.contains(id))
        {
            return false;
        }

        if !filters.lesson_ids.is_empty()
            && !noun.lesson_ids.iter().any(|id| filters.lesson_ids.contains(id))
        {
            return false;
        }

        true
    }
}

/// Verbs ordered by frequency rank (unranked last), cut to the difficulty tier
pub fn verb_tier(verbs: &[VerbRecord], difficulty: Difficulty) -> Vec<VerbRecord> {
    let mut ranked: Vec<VerbRecord> = verbs.to_vec();
    ranked.sort_by_key(|v| (v.frequency_rank.is_none(), v.frequency_rank, v.id));

    let limit = match difficulty {
        Difficulty::Easy => EASY_VERB_LIMIT,
        Difficulty::Medium => MEDIUM_VERB_LIMIT,
        Difficulty::Hard => ranked.len(),
    };

    ranked.truncate(limit);
    ranked
}

/// Tenses permitted at a difficulty.
/// Easy keeps the single lowest-ordered tense, medium every tense within the
/// two lowest distinct order values, hard everything.
pub fn tense_tier(tenses: &[TenseRecord], difficulty: Difficulty) -> Vec<TenseRecord> {
    let mut ordered: Vec<TenseRecord> = tenses.to_vec();
    ordered.sort_by_key(|t| (t.order_index, t.id));

    match difficulty {
        Difficulty::Easy => ordered.into_iter().take(1).collect(),
        Difficulty::Medium => {
            let lowest: BTreeSet<i32> = ordered.iter().map(|t| t.order_index).collect();
            let allowed: Vec<i32> = lowest.into_iter().take(2).collect();
            ordered
                .into_iter()
                .filter(|t| allowed.contains(&t.order_index))
                .collect()
        }
        Difficulty::Hard => ordered,
    }
}
