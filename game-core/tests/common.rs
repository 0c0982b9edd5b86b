#![allow(dead_code)]

use game_core::{GameSession, QuestionPool, QuestionPoolBuilder};
use game_types::{
    ConjugationRecord, CreateSession, Difficulty, GameMode, Identity, LanguageData, LanguagePair,
    NounRecord, PoolFilters, PronounRecord, SessionEvent, TenseRecord, Translation, VerbRecord,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const GERMAN: i32 = 1;
pub const ENGLISH: i32 = 2;

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn german_english_pair() -> LanguagePair {
    LanguagePair {
        id: 1,
        source_language_id: ENGLISH,
        target_language_id: GERMAN,
        gender_options: vec!["der".to_string(), "die".to_string(), "das".to_string()],
    }
}

/// Creates a German noun with an English translation
pub fn noun(id: i32, word: &str, gender: Option<&str>, translation: &str) -> NounRecord {
    NounRecord {
        id,
        word: word.to_string(),
        gender: gender.map(str::to_string),
        language_id: GERMAN,
        category_id: None,
        list_ids: Vec::new(),
        lesson_ids: Vec::new(),
        translations: vec![Translation {
            language_id: ENGLISH,
            text: translation.to_string(),
        }],
    }
}

pub fn five_nouns() -> Vec<NounRecord> {
    vec![
        noun(1, "Hund", Some("der"), "dog"),
        noun(2, "Katze", Some("die"), "cat"),
        noun(3, "Haus", Some("das"), "house"),
        noun(4, "Baum", Some("der"), "tree"),
        noun(5, "Blume", Some("die"), "flower"),
    ]
}

const VERBS: [(i32, &str, &str); 4] = [
    (1, "sein", "to be"),
    (2, "haben", "to have"),
    (3, "gehen", "to go"),
    (4, "machen", "to make"),
];

const TENSES: [(i32, &str, i32); 3] = [(1, "Präsens", 1), (2, "Präteritum", 2), (3, "Perfekt", 3)];

const PRONOUNS: [(i32, &str, &str); 4] = [
    (1, "ich", "1s"),
    (2, "du", "2s"),
    (3, "er/sie/es", "3s"),
    (4, "", "1p"),
];

/// Every verb conjugated in every tense and person, each form unique
pub fn sample_language_data() -> LanguageData {
    let mut nouns = five_nouns();
    nouns.push(noun(6, "Auto", Some("das"), "car"));
    nouns.push(noun(7, "Tisch", Some("der"), "table"));
    nouns.push(noun(8, "Eltern", None, "parents"));

    let verbs = VERBS
        .iter()
        .map(|(id, infinitive, translation)| VerbRecord {
            id: *id,
            infinitive: infinitive.to_string(),
            translation: Some(translation.to_string()),
            language_id: GERMAN,
            frequency_rank: Some(*id),
            list_ids: Vec::new(),
        })
        .collect();

    let tenses = TENSES
        .iter()
        .map(|(id, name, order_index)| TenseRecord {
            id: *id,
            name: name.to_string(),
            order_index: *order_index,
            language_id: GERMAN,
        })
        .collect();

    let pronouns = PRONOUNS
        .iter()
        .map(|(id, display, code)| PronounRecord {
            id: *id,
            order_index: *id,
            display: Some(display.to_string()).filter(|d| !d.is_empty()),
            code: Some(code.to_string()),
            language_id: GERMAN,
        })
        .collect();

    let mut conjugations = Vec::new();
    for (verb_id, infinitive, _) in VERBS {
        for (tense_id, _, _) in TENSES {
            for (pronoun_id, _, code) in PRONOUNS {
                conjugations.push(ConjugationRecord {
                    verb_id,
                    tense_id,
                    pronoun_id,
                    form: format!("{}-{}-{}", infinitive, tense_id, code),
                });
            }
        }
    }

    LanguageData {
        pair: german_english_pair(),
        nouns,
        verbs,
        conjugations,
        tenses,
        pronouns,
    }
}

pub fn hard_pool() -> QuestionPool {
    QuestionPoolBuilder::build(&sample_language_data(), &PoolFilters::default(), Difficulty::Hard)
}

pub fn create_request(max_players: u32) -> CreateSession {
    CreateSession {
        language_pair_id: 1,
        max_players,
        difficulty: Difficulty::Easy,
        mode: GameMode::GenderDuel {
            filters: PoolFilters::default(),
        },
    }
}

pub fn create_test_user(name: &str) -> Identity {
    Identity::user(Uuid::new_v4(), name)
}

/// Creates a waiting session; the returned identity is the host
pub fn create_waiting_session(max_players: u32) -> (GameSession, Identity) {
    let host = create_test_user("Host");
    let (session, _) = GameSession::create(Uuid::new_v4(), create_request(max_players), &host)
        .expect("session should be created");
    (session, host)
}

/// Creates an in-progress session with the host plus `others` joined players
pub fn create_running_session(max_players: u32, others: usize) -> (GameSession, Vec<Identity>) {
    let (mut session, host) = create_waiting_session(max_players);
    let mut players = vec![host];

    for i in 0..others {
        let player = create_test_user(&format!("Player{}", i + 1));
        session.join(&player, 1).expect("join should succeed");
        players.push(player);
    }

    for player in &players {
        session.ready(player.id).expect("ready should succeed");
    }

    (session, players)
}

/// Event collector for checking what a sequence of operations emitted
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, events: Vec<SessionEvent>) {
        self.events.lock().unwrap().extend(events);
    }

    pub fn get_events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }

    pub fn has_event_type(&self, check_fn: impl Fn(&SessionEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(check_fn)
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
