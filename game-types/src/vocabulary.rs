use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Translation {
    pub language_id: i32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NounRecord {
    pub id: i32,
    pub word: String,
    pub gender: Option<String>,
    pub language_id: i32,
    pub category_id: Option<i32>,
    pub list_ids: Vec<i32>,
    pub lesson_ids: Vec<i32>,
    pub translations: Vec<Translation>,
}

impl NounRecord {
    pub fn translation_for(&self, language_id: i32) -> Option<&str> {
        self.translations
            .iter()
            .find(|t| t.language_id == language_id && !t.text.trim().is_empty())
            .map(|t| t.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VerbRecord {
    pub id: i32,
    pub infinitive: String,
    pub translation: Option<String>,
    pub language_id: i32,
    pub frequency_rank: Option<i32>,
    pub list_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConjugationRecord {
    pub verb_id: i32,
    pub tense_id: i32,
    pub pronoun_id: i32,
    pub form: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TenseRecord {
    pub id: i32,
    pub name: String,
    pub order_index: i32,
    pub language_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PronounRecord {
    pub id: i32,
    pub order_index: i32,
    pub display: Option<String>,
    pub code: Option<String>,
    pub language_id: i32,
}

impl PronounRecord {
    /// Human-readable label: display text, then code, then nothing
    pub fn label(&self) -> String {
        self.display
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(self.code.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LanguagePair {
    pub id: i32,
    pub source_language_id: i32,
    pub target_language_id: i32,
    pub gender_options: Vec<String>,
}

/// Everything the engine may draw from for one language pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageData {
    pub pair: LanguagePair,
    pub nouns: Vec<NounRecord>,
    pub verbs: Vec<VerbRecord>,
    pub conjugations: Vec<ConjugationRecord>,
    pub tenses: Vec<TenseRecord>,
    pub pronouns: Vec<PronounRecord>,
}

/// Optional narrowing of the vocabulary pool.
/// Dimensions combine with AND, ids within one dimension with OR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PoolFilters {
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub noun_list_ids: Vec<i32>,
    #[serde(default)]
    pub verb_list_ids: Vec<i32>,
    #[serde(default)]
    pub lesson_ids: Vec<i32>,
}
