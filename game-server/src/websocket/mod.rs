use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::session_manager::SessionManager;
use game_types::{ClientMessage, ServerMessage};

pub mod connection;
pub mod handlers;
pub mod rate_limiter;

use connection::ConnectionId;
pub use connection::ConnectionManager;
use handlers::MessageHandler;
use rate_limiter::RateLimiter;

pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    session_manager: Arc<SessionManager>,
) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let rate_limiter = RateLimiter::new();

    let message_receiver = connection_manager.create_connection(connection_id).await;

    let message_handler = MessageHandler::new(
        connection_id,
        connection_manager.clone(),
        session_manager.clone(),
    );

    let incoming_handler = {
        let connection_manager = connection_manager.clone();
        let message_handler = message_handler.clone();
        let mut rate_limiter = rate_limiter.clone();

        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        match handle_message(msg, &mut rate_limiter, &message_handler, connection_id)
                            .await
                        {
                            Ok(()) => {}
                            Err(MessageError::Malformed(reason)) => {
                                // Bad input is reported, the socket stays open
                                let _ = connection_manager
                                    .send_to_connection(
                                        connection_id,
                                        ServerMessage::Error { message: reason },
                                    )
                                    .await;
                            }
                            Err(MessageError::Fatal(reason)) => {
                                error!("Error handling message for {}: {}", connection_id, reason);
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", connection_id, e);
                        break;
                    }
                }
            }
        }
    };

    let outgoing_handler = {
        async move {
            let mut receiver = message_receiver;

            while let Some(message) = receiver.recv().await {
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize message: {:?}", e);
                        continue;
                    }
                };

                if let Err(e) = ws_sender.send(Message::text(json)).await {
                    warn!("Failed to send message to {}: {:?}", connection_id, e);
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    info!("Connection {} disconnected", connection_id);
    message_handler.handle_disconnect().await;
    connection_manager.remove_connection(connection_id).await;
}

#[derive(Debug)]
enum MessageError {
    Malformed(String),
    Fatal(String),
}

async fn handle_message(
    msg: Message,
    rate_limiter: &mut RateLimiter,
    message_handler: &MessageHandler,
    connection_id: ConnectionId,
) -> Result<(), MessageError> {
    if !rate_limiter.check_rate_limit().await {
        warn!("Rate limit exceeded for connection {}", connection_id);
        return Err(MessageError::Fatal("Rate limit exceeded".to_string()));
    }

    // Only handle text messages
    if !msg.is_text() {
        return Ok(());
    }

    let text = msg
        .to_str()
        .map_err(|_| MessageError::Malformed("Invalid text message".to_string()))?;

    let client_message: ClientMessage = serde_json::from_str(text)
        .map_err(|e| MessageError::Malformed(format!("Invalid JSON message: {}", e)))?;

    message_handler
        .handle_message(client_message)
        .await
        .map_err(|e| MessageError::Fatal(format!("Message handling error: {}", e)))
}
