use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::identity::parse_token;
use crate::session_manager::{SessionManager, SessionManagerError};
use crate::websocket::connection::{ConnectionId, ConnectionManager};
use game_types::{ClientMessage, GridPosition, Identity, ServerMessage, SessionId};

#[derive(Clone)]
pub struct MessageHandler {
    connection_id: ConnectionId,
    connection_manager: Arc<ConnectionManager>,
    session_manager: Arc<SessionManager>,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        connection_manager: Arc<ConnectionManager>,
        session_manager: Arc<SessionManager>,
    ) -> Self {
        Self {
            connection_id,
            connection_manager,
            session_manager,
        }
    }

    pub async fn handle_message(&self, message: ClientMessage) -> Result<(), String> {
        self.connection_manager
            .update_activity(self.connection_id)
            .await;

        match message {
            ClientMessage::Authenticate { token } => self.handle_authenticate(token).await,
            ClientMessage::Subscribe { session_id } => self.handle_subscribe(session_id).await,
            ClientMessage::Unsubscribe => self.handle_unsubscribe().await,
            ClientMessage::Ready => self.handle_ready().await,
            ClientMessage::Leave => self.handle_leave().await,
            ClientMessage::SubmitAnswer { round, answer } => {
                self.handle_submit_answer(round, answer).await
            }
            ClientMessage::SelectCells { start, end } => self.handle_select_cells(start, end).await,
            ClientMessage::FlipCard { card_id } => self.handle_flip_card(card_id).await,
            ClientMessage::Heartbeat => Ok(()),
        }
    }

    /// A dropped socket only stops the event stream. Seats are kept so the
    /// player can reconnect and subscribe again.
    pub async fn handle_disconnect(&self) {
        if let Some(connection) = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
        {
            if let Some(session_id) = connection.session_id {
                info!(
                    "Connection {} stopped watching session {}",
                    self.connection_id, session_id
                );
            }
        }
    }

    async fn handle_authenticate(&self, token: String) -> Result<(), String> {
        info!("Authenticating connection {}", self.connection_id);

        let identity = match parse_token(&token) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(
                    "Authentication failed for connection {}: {}",
                    self.connection_id, e
                );
                return self
                    .send_message(ServerMessage::AuthenticationFailed {
                        reason: e.to_string(),
                    })
                    .await;
            }
        };

        match self
            .connection_manager
            .authenticate_connection(self.connection_id, identity.clone())
            .await
        {
            Ok(()) => {
                self.send_message(ServerMessage::AuthenticationSuccess { identity })
                    .await
            }
            Err(reason) => {
                self.send_message(ServerMessage::AuthenticationFailed { reason })
                    .await
            }
        }
    }

    async fn handle_subscribe(&self, session_id: String) -> Result<(), String> {
        let Some(identity) = self.require_identity().await? else {
            return Ok(());
        };

        let Ok(session_id) = Uuid::parse_str(&session_id) else {
            return self.send_error("Invalid session ID format").await;
        };

        let (state, play) = match self.session_manager.snapshot(session_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => return self.send_failure(e).await,
        };

        if !state.is_member(identity.id) {
            return self
                .send_message(ServerMessage::Rejected {
                    error: game_types::GameError::PlayerNotFound {
                        player_id: identity.id.to_string(),
                    },
                })
                .await;
        }

        self.connection_manager
            .set_connection_session(self.connection_id, Some(session_id))
            .await;
        debug!(
            "Connection {} subscribed to session {}",
            self.connection_id, session_id
        );
        self.send_message(ServerMessage::Subscribed { state, play })
            .await
    }

    async fn handle_unsubscribe(&self) -> Result<(), String> {
        self.connection_manager
            .set_connection_session(self.connection_id, None)
            .await;
        self.send_message(ServerMessage::Unsubscribed).await
    }

    async fn handle_ready(&self) -> Result<(), String> {
        let Some((session_id, identity)) = self.require_session().await? else {
            return Ok(());
        };

        match self.session_manager.ready(session_id, identity.id).await {
            Ok(_) => Ok(()),
            Err(e) => self.send_failure(e).await,
        }
    }

    async fn handle_leave(&self) -> Result<(), String> {
        let Some((session_id, identity)) = self.require_session().await? else {
            return Ok(());
        };

        match self.session_manager.leave(session_id, identity.id).await {
            Ok(_) => {
                self.connection_manager
                    .set_connection_session(self.connection_id, None)
                    .await;
                self.send_message(ServerMessage::Unsubscribed).await
            }
            Err(e) => self.send_failure(e).await,
        }
    }

    async fn handle_submit_answer(&self, round: u32, answer: String) -> Result<(), String> {
        let Some((session_id, identity)) = self.require_session().await? else {
            return Ok(());
        };

        match self
            .session_manager
            .submit_answer(session_id, identity.id, round, &answer)
            .await
        {
            Ok(correct) => {
                debug!(
                    "Player {} answered round {} ({})",
                    identity.id,
                    round,
                    if correct { "correct" } else { "wrong" }
                );
                Ok(())
            }
            Err(e) => self.send_failure(e).await,
        }
    }

    async fn handle_select_cells(&self, start: GridPosition, end: GridPosition) -> Result<(), String> {
        let Some((session_id, identity)) = self.require_session().await? else {
            return Ok(());
        };

        match self
            .session_manager
            .select_cells(session_id, identity.id, start, end)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => self.send_failure(e).await,
        }
    }

    async fn handle_flip_card(&self, card_id: u32) -> Result<(), String> {
        let Some((session_id, identity)) = self.require_session().await? else {
            return Ok(());
        };

        match self
            .session_manager
            .flip_card(session_id, identity.id, card_id)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => self.send_failure(e).await,
        }
    }

    /// The connection's identity, or an error sent back to the client
    async fn require_identity(&self) -> Result<Option<Identity>, String> {
        let connection = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
            .ok_or("Connection not found")?;

        match connection.identity {
            Some(identity) => Ok(Some(identity)),
            None => {
                self.send_error("Authentication required").await?;
                Ok(None)
            }
        }
    }

    async fn require_session(&self) -> Result<Option<(SessionId, Identity)>, String> {
        let Some(identity) = self.require_identity().await? else {
            return Ok(None);
        };

        let session_id = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
            .and_then(|conn| conn.session_id);

        match session_id {
            Some(session_id) => Ok(Some((session_id, identity))),
            None => {
                self.send_error("Not subscribed to a session").await?;
                Ok(None)
            }
        }
    }

    async fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.connection_manager
            .send_to_connection(self.connection_id, message)
            .await
    }

    async fn send_error(&self, error_message: &str) -> Result<(), String> {
        self.send_message(ServerMessage::Error {
            message: error_message.to_string(),
        })
        .await
    }

    async fn send_failure(&self, failure: SessionManagerError) -> Result<(), String> {
        match failure {
            SessionManagerError::Game(error) => {
                self.send_message(ServerMessage::Rejected { error }).await
            }
            SessionManagerError::Storage(e) => {
                error!("Storage failure for {}: {}", self.connection_id, e);
                self.send_error("Internal server error").await
            }
        }
    }
}
