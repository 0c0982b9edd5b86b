use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_players_per_session: u32,
    pub prompts_per_game: usize,
    pub session_retention_minutes: u64,
    pub connection_timeout_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://lingua_arena.db?mode=rwc".to_string()),
            max_players_per_session: env::var("MAX_PLAYERS_PER_SESSION")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .expect("Invalid MAX_PLAYERS_PER_SESSION"),
            prompts_per_game: env::var("PROMPTS_PER_GAME")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid PROMPTS_PER_GAME"),
            session_retention_minutes: env::var("SESSION_RETENTION_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("Invalid SESSION_RETENTION_MINUTES"),
            connection_timeout_seconds: env::var("CONNECTION_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("Invalid CONNECTION_TIMEOUT_SECONDS"),
            cleanup_interval_seconds: env::var("CLEANUP_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("Invalid CLEANUP_INTERVAL_SECONDS"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
