#![allow(dead_code)]

use game_persistence::InMemoryVocabulary;
use game_server::session_manager::{SessionManager, SessionSettings};
use game_server::websocket::connection::{ConnectionId, ConnectionManager};
use game_types::{
    ConjugationRecord, CreateSession, Difficulty, GameMode, Identity, LanguageData, LanguagePair,
    NounRecord, PoolFilters, PronounRecord, ServerMessage, SessionEvent, SessionId, TenseRecord,
    Translation, VerbRecord,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub const GERMAN: i32 = 1;
pub const ENGLISH: i32 = 2;
pub const PAIR_ID: i32 = 1;

pub const NOUNS: [(&str, Option<&str>, &str); 8] = [
    ("Hund", Some("der"), "dog"),
    ("Katze", Some("die"), "cat"),
    ("Haus", Some("das"), "house"),
    ("Baum", Some("der"), "tree"),
    ("Blume", Some("die"), "flower"),
    ("Auto", Some("das"), "car"),
    ("Tisch", Some("der"), "table"),
    ("Lampe", Some("die"), "lamp"),
];

const VERBS: [(i32, &str, &str); 3] = [(1, "sein", "to be"), (2, "haben", "to have"), (3, "gehen", "to go")];

const TENSES: [(i32, &str); 2] = [(1, "Präsens"), (2, "Perfekt")];

const PRONOUNS: [(i32, &str); 3] = [(1, "ich"), (2, "du"), (3, "wir")];

/// German vocabulary taught from English, every conjugation form unique
pub fn sample_language_data() -> LanguageData {
    let nouns = NOUNS
        .iter()
        .enumerate()
        .map(|(i, (word, gender, translation))| NounRecord {
            id: i as i32 + 1,
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
        })
        .collect();

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
        .map(|(id, name)| TenseRecord {
            id: *id,
            name: name.to_string(),
            order_index: *id,
            language_id: GERMAN,
        })
        .collect();

    let pronouns = PRONOUNS
        .iter()
        .map(|(id, display)| PronounRecord {
            id: *id,
            order_index: *id,
            display: Some(display.to_string()),
            code: None,
            language_id: GERMAN,
        })
        .collect();

    let mut conjugations = Vec::new();
    for (verb_id, infinitive, _) in VERBS {
        for (tense_id, _) in TENSES {
            for (pronoun_id, pronoun) in PRONOUNS {
                conjugations.push(ConjugationRecord {
                    verb_id,
                    tense_id,
                    pronoun_id,
                    form: format!("{}-{}-{}", infinitive, tense_id, pronoun),
                });
            }
        }
    }

    LanguageData {
        pair: LanguagePair {
            id: PAIR_ID,
            source_language_id: ENGLISH,
            target_language_id: GERMAN,
            gender_options: vec!["der".to_string(), "die".to_string(), "das".to_string()],
        },
        nouns,
        verbs,
        conjugations,
        tenses,
        pronouns,
    }
}

/// The other face of a memory card
pub fn memory_partner(face: &str) -> Option<&'static str> {
    NOUNS.iter().find_map(|(word, _, translation)| {
        if *word == face {
            Some(*translation)
        } else if *translation == face {
            Some(*word)
        } else {
            None
        }
    })
}

pub fn create_test_user(name: &str) -> Identity {
    Identity::user(Uuid::new_v4(), name)
}

pub fn create_request(max_players: u32, mode: GameMode) -> CreateSession {
    CreateSession {
        language_pair_id: PAIR_ID,
        max_players,
        difficulty: Difficulty::Easy,
        mode,
    }
}

pub fn gender_duel() -> GameMode {
    GameMode::GenderDuel {
        filters: PoolFilters::default(),
    }
}

/// Test setup that provides all necessary components
pub struct TestServerSetup {
    pub connection_manager: Arc<ConnectionManager>,
    pub session_manager: Arc<SessionManager>,
}

impl TestServerSetup {
    pub fn new() -> Self {
        Self::with_settings(SessionSettings::default())
    }

    pub fn with_settings(settings: SessionSettings) -> Self {
        let connection_manager = Arc::new(ConnectionManager::new());
        let vocabulary = InMemoryVocabulary::new().with_pair(sample_language_data());
        let session_manager = Arc::new(SessionManager::new(
            connection_manager.clone(),
            Arc::new(vocabulary),
            settings,
        ));

        Self {
            connection_manager,
            session_manager,
        }
    }

    /// Creates a connection for `identity` watching `session_id`
    pub async fn subscribe(
        &self,
        identity: &Identity,
        session_id: SessionId,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let connection_id = ConnectionId::new();
        let receiver = self
            .connection_manager
            .create_connection(connection_id)
            .await;
        self.connection_manager
            .authenticate_connection(connection_id, identity.clone())
            .await
            .expect("identity should authenticate");
        self.connection_manager
            .set_connection_session(connection_id, Some(session_id))
            .await;
        receiver
    }
}

/// Session events received so far, in order
pub fn drain_events(receiver: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        if let ServerMessage::SessionEvent { event, .. } = message {
            events.push(event);
        }
    }
    events
}

pub fn event_names(events: &[SessionEvent]) -> Vec<&'static str> {
    events.iter().map(SessionEvent::name).collect()
}
