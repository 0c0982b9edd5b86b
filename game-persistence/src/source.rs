use anyhow::Result;
use async_trait::async_trait;
use game_types::LanguageData;
use std::collections::HashMap;

/// Read-only access to the vocabulary for one language pair
#[async_trait]
pub trait VocabularySource: Send + Sync {
    async fn load_language_data(&self, language_pair_id: i32) -> Result<Option<LanguageData>>;
}

/// Vocabulary held in memory, keyed by language pair id
#[derive(Debug, Clone, Default)]
pub struct InMemoryVocabulary {
    pairs: HashMap<i32, LanguageData>,
}

impl InMemoryVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(mut self, data: LanguageData) -> Self {
        self.pairs.insert(data.pair.id, data);
        self
    }
}

#[async_trait]
impl VocabularySource for InMemoryVocabulary {
    async fn load_language_data(&self, language_pair_id: i32) -> Result<Option<LanguageData>> {
        Ok(self.pairs.get(&language_pair_id).cloned())
    }
}
