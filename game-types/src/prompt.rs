use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TaskType {
    ArticleGender,
    Translation,
    VerbConjugation,
}

/// A multiple-choice question. Never persisted; regenerated per session run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "task", rename_all = "snake_case")]
#[ts(export)]
pub enum Prompt {
    ArticleGender {
        noun_id: i32,
        word: String,
        translation: String,
        options: Vec<String>,
        correct_answer: String,
    },
    Translation {
        noun_id: i32,
        word: String,
        options: Vec<String>,
        correct_answer: String,
    },
    VerbConjugation {
        verb_id: i32,
        infinitive: String,
        translation: Option<String>,
        tense_id: i32,
        tense_name: String,
        pronoun_id: i32,
        pronoun_label: String,
        options: Vec<String>,
        correct_answer: String,
    },
}

impl Prompt {
    pub fn task_type(&self) -> TaskType {
        match self {
            Prompt::ArticleGender { .. } => TaskType::ArticleGender,
            Prompt::Translation { .. } => TaskType::Translation,
            Prompt::VerbConjugation { .. } => TaskType::VerbConjugation,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            Prompt::ArticleGender { options, .. }
            | Prompt::Translation { options, .. }
            | Prompt::VerbConjugation { options, .. } => options,
        }
    }

    pub fn correct_answer(&self) -> &str {
        match self {
            Prompt::ArticleGender { correct_answer, .. }
            | Prompt::Translation { correct_answer, .. }
            | Prompt::VerbConjugation { correct_answer, .. } => correct_answer,
        }
    }

    /// Id of the noun or verb the prompt is about
    pub fn subject_id(&self) -> i32 {
        match self {
            Prompt::ArticleGender { noun_id, .. } | Prompt::Translation { noun_id, .. } => *noun_id,
            Prompt::VerbConjugation { verb_id, .. } => *verb_id,
        }
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim() == self.correct_answer()
    }
}
