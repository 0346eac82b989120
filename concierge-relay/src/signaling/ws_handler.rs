use crate::signaling::RelayService;
use axum::extract::State;
use axum::extract::WebSocketUpgrade;
use axum::extract::ws::{Message, WebSocket};
use axum::response::IntoResponse;
use concierge_core::{ParticipantId, Role, SignalMessage};
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

struct Session {
    connection: u64,
    tx: Option<mpsc::UnboundedSender<Message>>,
    identity: Option<(ParticipantId, Role)>,
}

async fn handle_socket(socket: WebSocket, service: RelayService) {
    let connection = service.next_connection_id();
    info!("New WebSocket connection #{}", connection);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Ends when the registry drops our sender (replace or removeUser).
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    });

    let mut session = Session {
        connection,
        tx: Some(tx),
        identity: None,
    };

    tokio::select! {
        _ = &mut send_task => {},
        _ = receive_frames(&service, &mut session, &mut receiver) => {},
    }
    send_task.abort();

    if let Some((user_id, _)) = session.identity {
        service.unregister(connection, &user_id);
    }
    info!("WebSocket #{} disconnected", connection);
}

async fn receive_frames(
    service: &RelayService,
    session: &mut Session,
    receiver: &mut SplitStream<WebSocket>,
) {
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match SignalMessage::from_json(text.as_str()) {
                Ok(signal) => handle_signal(service, session, signal, Message::Text(text)),
                Err(e) => warn!("Invalid SignalMessage on #{}: {}", session.connection, e),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }
}

fn handle_signal(
    service: &RelayService,
    session: &mut Session,
    signal: SignalMessage,
    frame: Message,
) {
    if let SignalMessage::Register { user_id, role } = signal {
        if session.identity.is_some() {
            warn!("#{} is already registered, ignoring register", session.connection);
            return;
        }
        let Some(tx) = session.tx.take() else {
            return;
        };
        service.register(session.connection, user_id.clone(), role, tx);
        session.identity = Some((user_id, role));
        return;
    }

    let Some((user_id, role)) = session.identity.as_ref() else {
        warn!(
            "'{}' before register on #{}, ignoring",
            signal.kind(),
            session.connection
        );
        return;
    };

    match &signal {
        SignalMessage::RemoveUser { user_id: target } => {
            if *role != Role::Owner {
                warn!("{} is not an owner, ignoring removeUser", user_id);
                return;
            }
            if !service.disconnect(target) {
                debug!("removeUser for unknown {}", target);
            }
        }
        _ => {
            let Some(target) = signal.target() else {
                warn!("'{}' from {} has no target", signal.kind(), user_id);
                return;
            };
            if signal.sender() != Some(user_id) {
                warn!(
                    "'{}' from {} claims sender {:?}, dropping",
                    signal.kind(),
                    user_id,
                    signal.sender()
                );
                return;
            }
            if service.forward(target, frame) {
                debug!("{} -> {}: {}", user_id, target, signal.kind());
            } else {
                warn!(
                    "Dropping '{}' from {}: {} is not connected",
                    signal.kind(),
                    user_id,
                    target
                );
            }
        }
    }
}
