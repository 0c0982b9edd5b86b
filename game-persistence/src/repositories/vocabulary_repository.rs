use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashMap;
use tracing::debug;

use crate::entities::{
    conjugations, language_pairs, lesson_nouns, noun_list_items, noun_translations, nouns,
    prelude::*, pronouns, tenses, verb_list_items, verbs,
};
use crate::VocabularySource;
use game_types::{
    ConjugationRecord, LanguageData, LanguagePair, NounRecord, PronounRecord, TenseRecord,
    Translation, VerbRecord,
};

pub struct VocabularyRepository {
    db: DatabaseConnection,
}

impl VocabularyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_pair(model: language_pairs::Model) -> Result<LanguagePair> {
        let gender_options = serde_json::from_str(&model.gender_options).with_context(|| {
            format!("Malformed gender options for language pair {}", model.id)
        })?;
        Ok(LanguagePair {
            id: model.id,
            source_language_id: model.source_language_id,
            target_language_id: model.target_language_id,
            gender_options,
        })
    }

    pub async fn find_pair(&self, language_pair_id: i32) -> Result<Option<LanguagePair>> {
        let model = LanguagePairs::find_by_id(language_pair_id)
            .one(&self.db)
            .await?;
        model.map(Self::model_to_pair).transpose()
    }

    pub async fn list_pairs(&self) -> Result<Vec<LanguagePair>> {
        let models = LanguagePairs::find()
            .order_by_asc(language_pairs::Column::Id)
            .all(&self.db)
            .await?;
        models.into_iter().map(Self::model_to_pair).collect()
    }

    /// Load every record a pool can draw from for one language pair
    pub async fn load(&self, language_pair_id: i32) -> Result<Option<LanguageData>> {
        let Some(pair) = self.find_pair(language_pair_id).await? else {
            return Ok(None);
        };
        let target = pair.target_language_id;

        let noun_models = Nouns::find()
            .filter(nouns::Column::LanguageId.eq(target))
            .order_by_asc(nouns::Column::Id)
            .all(&self.db)
            .await?;
        let noun_ids: Vec<i32> = noun_models.iter().map(|n| n.id).collect();

        let mut translations: HashMap<i32, Vec<Translation>> = HashMap::new();
        for t in NounTranslations::find()
            .filter(noun_translations::Column::NounId.is_in(noun_ids.clone()))
            .all(&self.db)
            .await?
        {
            translations.entry(t.noun_id).or_default().push(Translation {
                language_id: t.language_id,
                text: t.text,
            });
        }

        let mut noun_lists: HashMap<i32, Vec<i32>> = HashMap::new();
        for item in NounListItems::find()
            .filter(noun_list_items::Column::NounId.is_in(noun_ids.clone()))
            .all(&self.db)
            .await?
        {
            noun_lists.entry(item.noun_id).or_default().push(item.list_id);
        }

        let mut lessons: HashMap<i32, Vec<i32>> = HashMap::new();
        for item in LessonNouns::find()
            .filter(lesson_nouns::Column::NounId.is_in(noun_ids))
            .all(&self.db)
            .await?
        {
            lessons.entry(item.noun_id).or_default().push(item.lesson_id);
        }

        let nouns = noun_models
            .into_iter()
            .map(|n| NounRecord {
                translations: translations.remove(&n.id).unwrap_or_default(),
                list_ids: noun_lists.remove(&n.id).unwrap_or_default(),
                lesson_ids: lessons.remove(&n.id).unwrap_or_default(),
                id: n.id,
                word: n.word,
                gender: n.gender,
                language_id: n.language_id,
                category_id: n.category_id,
            })
            .collect::<Vec<_>>();

        let verb_models = Verbs::find()
            .filter(verbs::Column::LanguageId.eq(target))
            .order_by_asc(verbs::Column::Id)
            .all(&self.db)
            .await?;
        let verb_ids: Vec<i32> = verb_models.iter().map(|v| v.id).collect();

        let mut verb_lists: HashMap<i32, Vec<i32>> = HashMap::new();
        for item in VerbListItems::find()
            .filter(verb_list_items::Column::VerbId.is_in(verb_ids.clone()))
            .all(&self.db)
            .await?
        {
            verb_lists.entry(item.verb_id).or_default().push(item.list_id);
        }

        let verbs = verb_models
            .into_iter()
            .map(|v| VerbRecord {
                list_ids: verb_lists.remove(&v.id).unwrap_or_default(),
                id: v.id,
                infinitive: v.infinitive,
                translation: v.translation,
                language_id: v.language_id,
                frequency_rank: v.frequency_rank,
            })
            .collect::<Vec<_>>();

        let conjugations = Conjugations::find()
            .filter(conjugations::Column::VerbId.is_in(verb_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| ConjugationRecord {
                verb_id: c.verb_id,
                tense_id: c.tense_id,
                pronoun_id: c.pronoun_id,
                form: c.form,
            })
            .collect::<Vec<_>>();

        let tenses = Tenses::find()
            .filter(tenses::Column::LanguageId.eq(target))
            .order_by_asc(tenses::Column::OrderIndex)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| TenseRecord {
                id: t.id,
                name: t.name,
                order_index: t.order_index,
                language_id: t.language_id,
            })
            .collect::<Vec<_>>();

        let pronouns = Pronouns::find()
            .filter(pronouns::Column::LanguageId.eq(target))
            .order_by_asc(pronouns::Column::OrderIndex)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| PronounRecord {
                id: p.id,
                order_index: p.order_index,
                display: p.display,
                code: p.code,
                language_id: p.language_id,
            })
            .collect::<Vec<_>>();

        debug!(
            "Loaded pair {}: {} nouns, {} verbs, {} conjugations",
            language_pair_id,
            nouns.len(),
            verbs.len(),
            conjugations.len()
        );

        Ok(Some(LanguageData {
            pair,
            nouns,
            verbs,
            conjugations,
            tenses,
            pronouns,
        }))
    }

    /// Write a full vocabulary snapshot, keeping the record ids it carries
    pub async fn import(&self, data: &LanguageData) -> Result<()> {
        let txn = self.db.begin().await?;

        LanguagePairs::insert(language_pairs::ActiveModel {
            id: Set(data.pair.id),
            source_language_id: Set(data.pair.source_language_id),
            target_language_id: Set(data.pair.target_language_id),
            gender_options: Set(serde_json::to_string(&data.pair.gender_options)?),
        })
        .exec(&txn)
        .await?;

        for noun in &data.nouns {
            Nouns::insert(nouns::ActiveModel {
                id: Set(noun.id),
                word: Set(noun.word.clone()),
                gender: Set(noun.gender.clone()),
                language_id: Set(noun.language_id),
                category_id: Set(noun.category_id),
            })
            .exec(&txn)
            .await?;

            for translation in &noun.translations {
                NounTranslations::insert(noun_translations::ActiveModel {
                    id: NotSet,
                    noun_id: Set(noun.id),
                    language_id: Set(translation.language_id),
                    text: Set(translation.text.clone()),
                })
                .exec(&txn)
                .await?;
            }

            for list_id in &noun.list_ids {
                NounListItems::insert(noun_list_items::ActiveModel {
                    id: NotSet,
                    list_id: Set(*list_id),
                    noun_id: Set(noun.id),
                })
                .exec(&txn)
                .await?;
            }

            for lesson_id in &noun.lesson_ids {
                LessonNouns::insert(lesson_nouns::ActiveModel {
                    id: NotSet,
                    lesson_id: Set(*lesson_id),
                    noun_id: Set(noun.id),
                })
                .exec(&txn)
                .await?;
            }
        }

        for verb in &data.verbs {
            Verbs::insert(verbs::ActiveModel {
                id: Set(verb.id),
                infinitive: Set(verb.infinitive.clone()),
                translation: Set(verb.translation.clone()),
                language_id: Set(verb.language_id),
                frequency_rank: Set(verb.frequency_rank),
            })
            .exec(&txn)
            .await?;

            for list_id in &verb.list_ids {
                VerbListItems::insert(verb_list_items::ActiveModel {
                    id: NotSet,
                    list_id: Set(*list_id),
                    verb_id: Set(verb.id),
                })
                .exec(&txn)
                .await?;
            }
        }

        for tense in &data.tenses {
            Tenses::insert(tenses::ActiveModel {
                id: Set(tense.id),
                name: Set(tense.name.clone()),
                order_index: Set(tense.order_index),
                language_id: Set(tense.language_id),
            })
            .exec(&txn)
            .await?;
        }

        for pronoun in &data.pronouns {
            Pronouns::insert(pronouns::ActiveModel {
                id: Set(pronoun.id),
                order_index: Set(pronoun.order_index),
                display: Set(pronoun.display.clone()),
                code: Set(pronoun.code.clone()),
                language_id: Set(pronoun.language_id),
            })
            .exec(&txn)
            .await?;
        }

        for conjugation in &data.conjugations {
            Conjugations::insert(conjugations::ActiveModel {
                id: NotSet,
                verb_id: Set(conjugation.verb_id),
                tense_id: Set(conjugation.tense_id),
                pronoun_id: Set(conjugation.pronoun_id),
                form: Set(conjugation.form.clone()),
            })
            .exec(&txn)
            .await?;
        }

        txn.commit().await?;
        debug!("Imported vocabulary for pair {}", data.pair.id);
        Ok(())
    }
}

#[async_trait]
impl VocabularySource for VocabularyRepository {
    async fn load_language_data(&self, language_pair_id: i32) -> Result<Option<LanguageData>> {
        self.load(language_pair_id).await
    }
}
