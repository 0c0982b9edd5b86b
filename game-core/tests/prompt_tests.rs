mod common;

use common::*;
use game_core::{PromptSynthesizer, QuestionPoolBuilder};
use game_types::{
    ConjugationRecord, Difficulty, LanguageData, PoolFilters, Prompt, TaskType, VerbRecord,
};
use std::collections::HashSet;

fn assert_options_contract(prompt: &Prompt) {
    let options = prompt.options();
    assert_eq!(options.len(), 3, "prompt {:?}", prompt);

    let distinct: HashSet<&String> = options.iter().collect();
    assert_eq!(distinct.len(), 3, "duplicate options in {:?}", prompt);

    let correct = options
        .iter()
        .filter(|o| o.as_str() == prompt.correct_answer())
        .count();
    assert_eq!(correct, 1);
}

#[test]
fn test_five_noun_article_example() {
    let data = LanguageData {
        nouns: five_nouns(),
        ..sample_language_data()
    };
    let pool = QuestionPoolBuilder::build(&data, &PoolFilters::default(), Difficulty::Easy);
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(7));

    let prompts = synthesizer.synthesize(&pool, 5, &[TaskType::ArticleGender], None);

    assert_eq!(prompts.len(), 5);
    for prompt in &prompts {
        let Prompt::ArticleGender {
            noun_id,
            options,
            correct_answer,
            ..
        } = prompt
        else {
            panic!("expected article prompt, got {:?}", prompt);
        };

        let noun = five_nouns().into_iter().find(|n| n.id == *noun_id).unwrap();
        assert_eq!(Some(correct_answer.as_str()), noun.gender.as_deref());
        assert!(options.contains(correct_answer));
        assert_options_contract(prompt);
    }
}

#[test]
fn test_mixed_tasks_round_robin() {
    let pool = hard_pool();
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(3));
    let tasks = [
        TaskType::ArticleGender,
        TaskType::Translation,
        TaskType::VerbConjugation,
    ];

    let prompts = synthesizer.synthesize(&pool, 6, &tasks, None);

    assert_eq!(prompts.len(), 6);
    let order: Vec<TaskType> = prompts.iter().map(|p| p.task_type()).collect();
    assert_eq!(&order[..3], &tasks);
    assert_eq!(&order[3..], &tasks);
    prompts.iter().for_each(assert_options_contract);
}

#[test]
fn test_subjects_unique_per_call() {
    let pool = hard_pool();
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(11));

    let prompts = synthesizer.synthesize(&pool, 4, &[TaskType::VerbConjugation], None);
    assert_eq!(prompts.len(), 4);

    let subjects: HashSet<(TaskType, i32)> =
        prompts.iter().map(|p| (p.task_type(), p.subject_id())).collect();
    assert_eq!(subjects.len(), prompts.len());
}

#[test]
fn test_short_pool_terminates_with_fewer_prompts() {
    let pool = hard_pool();
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(5));

    // Seven gendered nouns cannot fill fifty prompts
    let prompts = synthesizer.synthesize(&pool, 50, &[TaskType::ArticleGender], None);
    assert_eq!(prompts.len(), 7);
}

#[test]
fn test_empty_pool_yields_nothing() {
    let data = LanguageData {
        nouns: Vec::new(),
        verbs: Vec::new(),
        ..sample_language_data()
    };
    let pool = QuestionPoolBuilder::build(&data, &PoolFilters::default(), Difficulty::Hard);
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(1));

    let prompts = synthesizer.synthesize(
        &pool,
        10,
        &[TaskType::Translation, TaskType::VerbConjugation],
        None,
    );
    assert!(prompts.is_empty());
}

#[test]
fn test_translation_needs_two_alternatives() {
    let data = LanguageData {
        nouns: vec![
            noun(1, "Hund", Some("der"), "dog"),
            noun(2, "Katze", Some("die"), "cat"),
        ],
        ..sample_language_data()
    };
    let pool = QuestionPoolBuilder::build(&data, &PoolFilters::default(), Difficulty::Hard);
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(2));

    let prompts = synthesizer.synthesize(&pool, 2, &[TaskType::Translation], None);
    assert!(prompts.is_empty());
}

#[test]
fn test_article_skipped_for_unknown_gender() {
    let data = LanguageData {
        nouns: vec![
            noun(1, "Hund", Some("der"), "dog"),
            noun(2, "Mädchen", Some("neuter"), "girl"),
        ],
        ..sample_language_data()
    };
    let pool = QuestionPoolBuilder::build(&data, &PoolFilters::default(), Difficulty::Hard);
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(4));

    let prompts = synthesizer.synthesize(&pool, 2, &[TaskType::ArticleGender], None);
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].subject_id(), 1);
}

#[test]
fn test_conjugation_distractors_prefer_same_tense() {
    let pool = hard_pool();
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(9));

    for prompt in synthesizer.synthesize(&pool, 4, &[TaskType::VerbConjugation], None) {
        let Prompt::VerbConjugation {
            infinitive,
            tense_id,
            options,
            ..
        } = &prompt
        else {
            panic!("expected conjugation prompt");
        };

        // Four pronouns per tense leave three same-tense candidates
        let prefix = format!("{}-{}-", infinitive, tense_id);
        assert!(options.iter().all(|o| o.starts_with(&prefix)));
        assert_options_contract(&prompt);
    }
}

#[test]
fn test_conjugation_falls_back_to_other_verbs() {
    let mut data = sample_language_data();
    // Only the first person exists, so same-verb tiers run dry on easy
    data.pronouns.retain(|p| p.id == 1);
    let pool = QuestionPoolBuilder::build(&data, &PoolFilters::default(), Difficulty::Easy);
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(6));

    let prompts = synthesizer.synthesize(&pool, 1, &[TaskType::VerbConjugation], None);
    assert_eq!(prompts.len(), 1);

    let Prompt::VerbConjugation {
        infinitive,
        options,
        correct_answer,
        pronoun_label,
        ..
    } = &prompts[0]
    else {
        panic!("expected conjugation prompt");
    };
    assert_eq!(pronoun_label, "ich");
    assert!(correct_answer.starts_with(infinitive.as_str()));
    let other_verbs = options
        .iter()
        .filter(|o| !o.starts_with(infinitive.as_str()))
        .count();
    assert_eq!(other_verbs, 2);
}

#[test]
fn test_tense_filter_restricts_conjugations() {
    let pool = hard_pool();
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(12));

    let prompts = synthesizer.synthesize(&pool, 4, &[TaskType::VerbConjugation], Some(&[3][..]));

    assert_eq!(prompts.len(), 4);
    for prompt in prompts {
        assert!(matches!(prompt, Prompt::VerbConjugation { tense_id: 3, .. }));
    }
}

#[test]
fn test_pronoun_label_falls_back_to_code() {
    let mut data = sample_language_data();
    data.pronouns.retain(|p| p.id == 4);
    let pool = QuestionPoolBuilder::build(&data, &PoolFilters::default(), Difficulty::Hard);
    let mut synthesizer = PromptSynthesizer::new(seeded_rng(8));

    let prompt = synthesizer.practice_prompt(&pool).expect("practice prompt");
    assert!(matches!(
        prompt,
        Prompt::VerbConjugation { ref pronoun_label, .. } if pronoun_label == "1p"
    ));
}

#[test]
fn test_conjugation_combinations_rotate_before_repeating() {
    let base = sample_language_data();
    let tenses: Vec<_> = base.tenses.iter().filter(|t| t.id <= 2).cloned().collect();
    let pronouns: Vec<_> = base.pronouns.iter().filter(|p| p.id <= 3).cloned().collect();
    let combinations = tenses.len() * pronouns.len();

    let verbs: Vec<VerbRecord> = (1..=12)
        .map(|id| VerbRecord {
            id,
            infinitive: format!("verb{}", id),
            translation: None,
            language_id: GERMAN,
            frequency_rank: Some(id),
            list_ids: Vec::new(),
        })
        .collect();

    let mut conjugations = Vec::new();
    for verb in &verbs {
        for tense in &tenses {
            for pronoun in &pronouns {
                conjugations.push(ConjugationRecord {
                    verb_id: verb.id,
                    tense_id: tense.id,
                    pronoun_id: pronoun.id,
                    form: format!("{}-{}-{}", verb.infinitive, tense.id, pronoun.id),
                });
            }
        }
    }

    let data = LanguageData {
        verbs,
        conjugations,
        tenses,
        pronouns,
        ..base
    };
    let pool = QuestionPoolBuilder::build(&data, &PoolFilters::default(), Difficulty::Hard);

    for seed in 0..10 {
        let mut synthesizer = PromptSynthesizer::new(seeded_rng(seed));
        let prompts =
            synthesizer.synthesize(&pool, combinations + 3, &[TaskType::VerbConjugation], None);

        // The run keeps going after every combination has been used once
        assert_eq!(prompts.len(), combinations + 3, "seed {}", seed);

        let asked: Vec<(i32, i32)> = prompts
            .iter()
            .map(|prompt| match prompt {
                Prompt::VerbConjugation {
                    tense_id,
                    pronoun_id,
                    ..
                } => (*tense_id, *pronoun_id),
                other => panic!("expected a conjugation prompt, got {:?}", other),
            })
            .collect();

        let first_rotation: HashSet<&(i32, i32)> = asked[..combinations].iter().collect();
        assert_eq!(first_rotation.len(), combinations, "seed {}", seed);

        let second_rotation: HashSet<&(i32, i32)> = asked[combinations..].iter().collect();
        assert_eq!(second_rotation.len(), 3, "seed {}", seed);
    }
}
