mod test_helpers;

use game_server::create_routes;
use game_types::{ServerMessage, SessionState, SessionStatus};
use serde_json::{Value, json};
use test_helpers::*;
use uuid::Uuid;
use warp::Filter;

fn create_test_app(
    setup: &TestServerSetup,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + Send + Sync + 'static
{
    create_routes(
        setup.connection_manager.clone(),
        setup.session_manager.clone(),
    )
}

fn bearer(id: Uuid, name: &str) -> String {
    format!("Bearer {}:{}", id, name)
}

fn create_body(max_players: u32) -> Value {
    json!({
        "language_pair_id": PAIR_ID,
        "max_players": max_players,
        "difficulty": "easy",
        "mode": { "mode": "gender_duel" }
    })
}

async fn recv_message(client: &mut warp::test::WsClient) -> ServerMessage {
    let message = client.recv().await.expect("websocket message");
    serde_json::from_str(message.to_str().expect("text frame")).expect("server message json")
}

#[tokio::test]
async fn test_session_lifecycle_over_http() {
    let setup = TestServerSetup::new();
    let app = create_test_app(&setup);
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();

    let response = warp::test::request()
        .method("POST")
        .path("/sessions")
        .header("authorization", bearer(host, "Alice"))
        .json(&create_body(2))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 201);
    let state: SessionState = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(state.players[0].display_name, "Alice");
    assert!(!state.players[0].is_guest());

    let open = warp::test::request()
        .method("GET")
        .path(&format!("/sessions?language_pair_id={}", PAIR_ID))
        .reply(&app)
        .await;
    assert_eq!(open.status(), 200);
    let open: Vec<SessionState> = serde_json::from_slice(open.body()).unwrap();
    assert_eq!(open.len(), 1);

    let joined = warp::test::request()
        .method("POST")
        .path(&format!("/sessions/{}/join", state.id))
        .header("x-guest-id", guest.to_string())
        .json(&json!({ "language_pair_id": PAIR_ID }))
        .reply(&app)
        .await;
    assert_eq!(joined.status(), 200);
    let joined: SessionState = serde_json::from_slice(joined.body()).unwrap();
    assert!(joined.player(guest).unwrap().is_guest());

    let again = warp::test::request()
        .method("POST")
        .path(&format!("/sessions/{}/join", state.id))
        .header("x-guest-id", guest.to_string())
        .json(&json!({ "language_pair_id": PAIR_ID }))
        .reply(&app)
        .await;
    assert_eq!(again.status(), 409);

    for (id, header) in [(host, "authorization"), (guest, "x-guest-id")] {
        let value = if header == "authorization" {
            bearer(id, "Alice")
        } else {
            id.to_string()
        };
        let response = warp::test::request()
            .method("POST")
            .path(&format!("/sessions/{}/ready", state.id))
            .header(header, value)
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
    }

    let prompts = warp::test::request()
        .method("GET")
        .path(&format!("/sessions/{}/prompts", state.id))
        .header("x-guest-id", guest.to_string())
        .reply(&app)
        .await;
    assert_eq!(prompts.status(), 200);

    let words = warp::test::request()
        .method("GET")
        .path(&format!("/sessions/{}/words", state.id))
        .header("x-guest-id", guest.to_string())
        .reply(&app)
        .await;
    assert_eq!(words.status(), 409);

    let forbidden = warp::test::request()
        .method("POST")
        .path(&format!("/sessions/{}/end", state.id))
        .header("x-guest-id", guest.to_string())
        .reply(&app)
        .await;
    assert_eq!(forbidden.status(), 403);

    let ended = warp::test::request()
        .method("POST")
        .path(&format!("/sessions/{}/end", state.id))
        .header("authorization", bearer(host, "Alice"))
        .reply(&app)
        .await;
    assert_eq!(ended.status(), 200);
    let ended: SessionState = serde_json::from_slice(ended.body()).unwrap();
    assert_eq!(ended.status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_session_view_hides_play_from_outsiders() {
    let setup = TestServerSetup::new();
    let app = create_test_app(&setup);
    let host = Uuid::new_v4();

    let response = warp::test::request()
        .method("POST")
        .path("/sessions")
        .header("x-guest-id", host.to_string())
        .json(&create_body(1))
        .reply(&app)
        .await;
    let state: SessionState = serde_json::from_slice(response.body()).unwrap();

    warp::test::request()
        .method("POST")
        .path(&format!("/sessions/{}/ready", state.id))
        .header("x-guest-id", host.to_string())
        .reply(&app)
        .await;

    let member_view = warp::test::request()
        .method("GET")
        .path(&format!("/sessions/{}", state.id))
        .header("x-guest-id", host.to_string())
        .reply(&app)
        .await;
    let member_view: Value = serde_json::from_slice(member_view.body()).unwrap();
    assert_eq!(member_view["state"]["status"], "in_progress");
    assert_eq!(member_view["play"]["kind"], "quiz");

    let outsider_view = warp::test::request()
        .method("GET")
        .path(&format!("/sessions/{}", state.id))
        .reply(&app)
        .await;
    let outsider_view: Value = serde_json::from_slice(outsider_view.body()).unwrap();
    assert!(outsider_view["play"].is_null());
}

#[tokio::test]
async fn test_practice_endpoint() {
    let setup = TestServerSetup::new();
    let app = create_test_app(&setup);

    let response = warp::test::request()
        .method("GET")
        .path(&format!(
            "/prompts/practice?language_pair_id={}&difficulty=hard&tense_ids=1,2",
            PAIR_ID
        ))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);
    let prompt: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(prompt["task"], "verb_conjugation");

    let bad_tenses = warp::test::request()
        .method("GET")
        .path(&format!(
            "/prompts/practice?language_pair_id={}&tense_ids=one",
            PAIR_ID
        ))
        .reply(&app)
        .await;
    assert_eq!(bad_tenses.status(), 400);

    let unknown_pair = warp::test::request()
        .method("GET")
        .path("/prompts/practice?language_pair_id=77")
        .reply(&app)
        .await;
    assert_eq!(unknown_pair.status(), 404);
}

#[tokio::test]
async fn test_websocket_subscribe_and_ready() {
    let setup = TestServerSetup::new();
    let app = create_test_app(&setup);
    let player = Uuid::new_v4();

    let state = setup
        .session_manager
        .create(
            &game_types::Identity::user(player, "Alice"),
            create_request(1, gender_duel()),
        )
        .await
        .unwrap();

    let mut client = warp::test::ws()
        .path("/ws")
        .handshake(app)
        .await
        .expect("handshake");

    // Commands need an identity first
    client.send_text(r#""Ready""#).await;
    assert!(matches!(
        recv_message(&mut client).await,
        ServerMessage::Error { message } if message == "Authentication required"
    ));

    client
        .send_text(json!({ "Authenticate": { "token": format!("{}:Alice", player) } }).to_string())
        .await;
    match recv_message(&mut client).await {
        ServerMessage::AuthenticationSuccess { identity } => assert_eq!(identity.id, player),
        other => panic!("expected authentication success, got {:?}", other),
    }

    client
        .send_text(json!({ "Subscribe": { "session_id": state.id.to_string() } }).to_string())
        .await;
    match recv_message(&mut client).await {
        ServerMessage::Subscribed { state: subscribed, play } => {
            assert_eq!(subscribed.id, state.id);
            assert!(play.is_none());
        }
        other => panic!("expected subscribed, got {:?}", other),
    }

    client.send_text(r#""Ready""#).await;
    let mut names = Vec::new();
    for _ in 0..2 {
        match recv_message(&mut client).await {
            ServerMessage::SessionEvent { session_id, event } => {
                assert_eq!(session_id, state.id.to_string());
                names.push(event.name());
            }
            other => panic!("expected a session event, got {:?}", other),
        }
    }
    assert_eq!(names, vec!["player_ready", "game_started"]);

    // Malformed input is reported and the socket stays usable
    client.send_text("{not json").await;
    assert!(matches!(
        recv_message(&mut client).await,
        ServerMessage::Error { message } if message.starts_with("Invalid JSON message")
    ));

    client
        .send_text(json!({ "SubmitAnswer": { "round": 5, "answer": "der" } }).to_string())
        .await;
    assert!(matches!(
        recv_message(&mut client).await,
        ServerMessage::Rejected { .. }
    ));
}

#[tokio::test]
async fn test_websocket_rejects_outsiders() {
    let setup = TestServerSetup::new();
    let app = create_test_app(&setup);

    let state = setup
        .session_manager
        .create(&create_test_user("Host"), create_request(2, gender_duel()))
        .await
        .unwrap();

    let mut client = warp::test::ws()
        .path("/ws")
        .handshake(app)
        .await
        .expect("handshake");

    client
        .send_text(json!({ "Authenticate": { "token": "not-a-token" } }).to_string())
        .await;
    assert!(matches!(
        recv_message(&mut client).await,
        ServerMessage::AuthenticationFailed { .. }
    ));

    client
        .send_text(json!({ "Authenticate": { "token": format!("guest:{}", Uuid::new_v4()) } }).to_string())
        .await;
    assert!(matches!(
        recv_message(&mut client).await,
        ServerMessage::AuthenticationSuccess { .. }
    ));

    client
        .send_text(json!({ "Subscribe": { "session_id": state.id.to_string() } }).to_string())
        .await;
    assert!(matches!(
        recv_message(&mut client).await,
        ServerMessage::Rejected {
            error: game_types::GameError::PlayerNotFound { .. }
        }
    ));

    client
        .send_text(json!({ "Subscribe": { "session_id": "nope" } }).to_string())
        .await;
    assert!(matches!(
        recv_message(&mut client).await,
        ServerMessage::Error { message } if message == "Invalid session ID format"
    ));
}
